pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod geometry;
pub mod poll;
pub mod raster;
pub mod render;
pub mod session;
pub mod submit;
pub mod transport;
pub mod types;

pub use editor::{EditorKind, FieldEditor};
pub use error::{Result, VerifyError};
pub use poll::{CancelToken, PollClient, PollOptions};
pub use render::{DocumentView, RenderChannel, RenderRequest, RenderedSurface};
pub use session::{SessionState, VerifySession};
pub use submit::SubmitClient;
pub use transport::{HttpResponse, HttpTransport, Transport};
pub use types::{Ack, BoundingBox, DocumentKind, DocumentSnapshot, ExtractedField, FieldMapping};
