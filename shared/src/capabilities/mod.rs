mod http;
mod timer;

pub use self::http::{
    ContentType, Http, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult, ValidatedUrl,
};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

// Crux's built-in Render covers view refreshes.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub timer: Timer<Event>,
}
