use tracing::warn;

use super::{labels, AppScreen, RouteParams, ScreenContext};
use crate::router::Screen;
use crate::view::ScreenView;

pub struct PreloadScreen;

impl Screen for PreloadScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "preload"
    }
}

impl AppScreen for PreloadScreen {
    fn view(&self, _cx: &ScreenContext) -> ScreenView {
        ScreenView::Preload
    }
}

pub struct MainScreen;

impl Screen for MainScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "main"
    }

    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        cx.bottom_bar.close(true);
    }
}

impl AppScreen for MainScreen {
    fn view(&self, cx: &ScreenContext) -> ScreenView {
        ScreenView::Main {
            employee_name: cx
                .collections
                .employees
                .current_employee(cx.current_employee)
                .map(crate::model::Employee::full_name),
        }
    }
}

pub struct AboutScreen;

impl Screen for AboutScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "about"
    }
}

impl AppScreen for AboutScreen {
    fn view(&self, _cx: &ScreenContext) -> ScreenView {
        ScreenView::About
    }
}

#[derive(Debug, Default)]
pub struct ErrorScreen {
    message: String,
    show_close_button: bool,
}

impl Screen for ErrorScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "error-screen"
    }

    fn show(&mut self, params: &RouteParams, _cx: &mut ScreenContext) {
        self.message = match &params.message {
            Some(message) => message.clone(),
            None => {
                warn!("error screen shown without a message");
                labels::UNKNOWN_ERROR.to_string()
            }
        };
        self.show_close_button = params.show_close_button;
    }
}

impl AppScreen for ErrorScreen {
    fn view(&self, _cx: &ScreenContext) -> ScreenView {
        ScreenView::Error {
            message: self.message.clone(),
            show_close_button: self.show_close_button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bottom_bar::{BarItem, BarState};
    use crate::screens::BarAction;

    #[test]
    fn main_closes_bar() {
        let mut cx = ScreenContext::default();
        cx.offer(vec![BarItem::text("x")], BarAction::SendAnother);
        cx.bottom_bar.set_disabled(true);
        MainScreen.show(&RouteParams::default(), &mut cx);
        assert_eq!(cx.bottom_bar.state(), BarState::Hidden);
        assert!(!cx.bottom_bar.is_disabled());
    }

    #[test]
    fn error_screen_shows_message() {
        let mut cx = ScreenContext::default();
        let mut screen = ErrorScreen::default();
        screen.show(&RouteParams::error("Сервер недоступен", true), &mut cx);
        assert_eq!(
            screen.view(&cx),
            ScreenView::Error {
                message: "Сервер недоступен".into(),
                show_close_button: true
            }
        );

        screen.show(&RouteParams::default(), &mut cx);
        assert_eq!(
            screen.view(&cx),
            ScreenView::Error {
                message: labels::UNKNOWN_ERROR.into(),
                show_close_button: false
            }
        );
    }
}
