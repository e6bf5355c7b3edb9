mod openai;

pub use openai::{OpenAiClient, API_KEY_VAR, BASE_URL_VAR};
