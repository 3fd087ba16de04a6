pub mod constants;
pub mod model_cache;
