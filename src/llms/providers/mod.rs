//! LLM provider implementations.
//!
//! | Provider | Module | Endpoint |
//! |----------|--------|----------|
//! | DeepSeek | [`deepseek`] | `POST {base_url}/chat/completions` |

pub mod deepseek;
