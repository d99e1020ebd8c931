//! The external rendering service.

use std::time::Duration;

use diagram_common::DiagramType;
use diagram_config::RenderConfig;

/// Longest response body kept in a [`RenderError::Status`] message.
const MAX_ERROR_BODY: usize = 512;

/// Failure of a single render call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The service answered with a non-success status.
    #[error("service responded with status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response was successful but did not contain an SVG document.
    #[error("response is not an SVG document")]
    NotSvg,
}

/// Turns diagram source into SVG text.
///
/// Implementations are called from blocking worker threads.
pub trait Renderer: Send + Sync {
    /// Renders `source` as a diagram of type `diagram_type`.
    fn render(&self, diagram_type: DiagramType, source: &str) -> Result<String, RenderError>;
}

/// Renderer backed by a Kroki-compatible HTTP service.
#[derive(Debug, Clone)]
pub struct KrokiRenderer {
    agent: ureq::Agent,
    base_url: String,
}

impl KrokiRenderer {
    /// Creates a renderer for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a renderer from the `[render]` configuration section.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            config.server_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// The endpoint that renders `diagram_type`.
    pub fn endpoint(&self, diagram_type: DiagramType) -> String {
        format!("{}/{}", self.base_url, diagram_type)
    }
}

impl Renderer for KrokiRenderer {
    fn render(&self, diagram_type: DiagramType, source: &str) -> Result<String, RenderError> {
        let response = self
            .agent
            .post(&self.endpoint(diagram_type))
            .set("Content-Type", "text/plain")
            .set("Accept", "image/svg+xml")
            .send_string(source);

        let body = match response {
            Ok(response) => response
                .into_string()
                .map_err(|e| RenderError::Transport(e.to_string()))?,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(RenderError::Status {
                    code,
                    body: truncate(body.trim(), MAX_ERROR_BODY),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(RenderError::Transport(transport.to_string()));
            }
        };

        check_svg(body)
    }
}

/// Accepts `body` only if it looks like an SVG document.
pub fn check_svg(body: String) -> Result<String, RenderError> {
    if body.contains("<svg") {
        Ok(body)
    } else {
        Err(RenderError::NotSvg)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
