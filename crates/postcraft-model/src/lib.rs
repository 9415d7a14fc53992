mod huggingface;
mod registry;
mod traits;

pub use huggingface::{EndpointConfig, HuggingFaceChatModel, HUGGINGFACE_ROUTER_URL};
pub use registry::{
    ApiToken, ModelSet, ModelSettings, API_TOKEN_ENV, DEFAULT_EVALUATOR_MODEL,
    DEFAULT_GENERATOR_MODEL, DEFAULT_OPTIMIZER_MODEL,
};
pub use traits::{ChatModel, Message, ModelError, ModelRole, Role};
