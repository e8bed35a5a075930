use assert_matches::assert_matches;
use crux_core::testing::AppTester;

use valentine_shared::bottom_bar::{BarItem, BarState};
use valentine_shared::capabilities::{
    HttpMethod, HttpRequest, HttpResponse, TimerOperation, TimerOutput,
};
use valentine_shared::model::{EmployeeId, ValentineId};
use valentine_shared::router::TransitionState;
use valentine_shared::screens::{labels, routes};
use valentine_shared::view::{PrivacyMode, ReceivedState, ScreenView, Slide, ViewModel};
use valentine_shared::{App, Effect, Event, Model};

const BASE: &str = "http://127.0.0.1:8000/api";

/// Drives the core the way a shell would, holding outstanding requests until answered.
struct Shell {
    app: AppTester<App, Effect>,
    model: Model,
    outstanding: Vec<Effect>,
}

impl Shell {
    fn new() -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
            outstanding: Vec::new(),
        }
    }

    fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        self.absorb(update.effects, update.events);
    }

    fn absorb(&mut self, effects: Vec<Effect>, events: Vec<Event>) {
        self.outstanding
            .extend(effects.into_iter().filter(|e| !matches!(e, Effect::Render(_))));
        for event in events {
            self.send(event);
        }
    }

    fn elapse_timers(&mut self) {
        while let Some(index) = self
            .outstanding
            .iter()
            .position(|e| matches!(e, Effect::Timer(_)))
        {
            let Effect::Timer(mut request) = self.outstanding.remove(index) else {
                unreachable!()
            };
            let TimerOperation::Start { id, .. } = request.operation.clone();
            let update = self
                .app
                .resolve(&mut request, TimerOutput::Elapsed { id })
                .expect("resolve timer");
            self.absorb(update.effects, update.events);
        }
    }

    fn http_urls(&self) -> Vec<String> {
        self.outstanding
            .iter()
            .filter_map(|e| match e {
                Effect::Http(request) => Some(request.operation.url().as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    /// Answers the outstanding request for `path` and returns what was asked.
    fn respond(&mut self, path: &str, status: u16, body: &str) -> HttpRequest {
        let url = format!("{BASE}{path}");
        let index = self
            .outstanding
            .iter()
            .position(|e| matches!(e, Effect::Http(r) if r.operation.url().as_str() == url))
            .unwrap_or_else(|| panic!("no request for {url}, have {:?}", self.http_urls()));
        let Effect::Http(mut request) = self.outstanding.remove(index) else {
            unreachable!()
        };
        let asked = request.operation.clone();
        let update = self
            .app
            .resolve(
                &mut request,
                Ok(HttpResponse::from_status(status, body.as_bytes().to_vec())),
            )
            .expect("resolve http");
        self.absorb(update.effects, update.events);
        asked
    }

    fn navigate(&mut self, route: &str) {
        self.send(Event::NavigationTriggered {
            route: route.to_string(),
        });
        self.elapse_timers();
    }

    fn click(&mut self) {
        self.send(Event::BottomBarClicked);
    }

    fn view(&self) -> ViewModel {
        self.app.view(&self.model)
    }
}

const EMPLOYEES: &str = r#"[
    {"id": 1, "name": "Я", "surname": "Сотрудник", "position": "QA"},
    {"id": 2, "name": "Анна", "surname": "Петрова", "position": "HR", "avatar": "/media/a.png"},
    {"id": 3, "name": "Борис", "surname": "Сидоров", "position": "Dev"}
]"#;

fn booted(received: &str) -> Shell {
    booted_with("[]", received)
}

fn booted_with(sent: &str, received: &str) -> Shell {
    let mut shell = Shell::new();
    shell.send(Event::Start {
        config: None,
        telegram_user_id: Some("100".into()),
    });
    shell.elapse_timers();
    assert_eq!(shell.view().screen, ScreenView::Preload);

    shell.respond(
        "/get-token/?telegram_user_id=100",
        200,
        r#"{"token": "abc", "employee_id": 1, "user_id": 10}"#,
    );
    let employees = shell.respond("/employee/", 200, EMPLOYEES);
    assert_eq!(employees.header("Authorization"), Some("Token abc"));
    shell.respond("/my-images/", 200, r#"[{"id": 5, "image": "/media/5.png"}]"#);
    shell.respond("/my-valentines/", 200, sent);
    shell.respond("/my-valentines/received/", 200, received);
    shell.elapse_timers();
    shell
}

const NOT_UP_TIME: &str = r#"{"is_up_time": false, "valentines": []}"#;

#[test]
fn bootstrap_lands_on_main() {
    let shell = booted(NOT_UP_TIME);
    let view = shell.view();

    assert_eq!(view.route.as_deref(), Some(routes::MAIN));
    assert_eq!(view.transition, TransitionState::Idle);
    assert_eq!(
        view.screen,
        ScreenView::Main {
            employee_name: Some("Я Сотрудник".into())
        }
    );
    assert_eq!(view.bottom_bar.state, BarState::Hidden);
    assert!(view.error.is_none());
    assert!(shell.http_urls().is_empty());
}

#[test]
fn unknown_telegram_id_shows_error_screen() {
    let mut shell = Shell::new();
    shell.send(Event::Start {
        config: None,
        telegram_user_id: Some("999".into()),
    });
    shell.respond(
        "/get-token/?telegram_user_id=999",
        404,
        r#"{"detail": "Not found."}"#,
    );
    shell.elapse_timers();

    assert_eq!(shell.model.current_route(), Some(routes::ERROR));
    assert_eq!(
        shell.view().screen,
        ScreenView::Error {
            message: "Cant get token, unknown telegram id.\ntelegram_user_id: 999".into(),
            show_close_button: false,
        }
    );
    assert!(shell.http_urls().is_empty());
}

#[test]
fn failed_initial_load_shows_error_screen() {
    let mut shell = Shell::new();
    shell.send(Event::Start {
        config: None,
        telegram_user_id: Some("100".into()),
    });
    shell.respond(
        "/get-token/?telegram_user_id=100",
        200,
        r#"{"token": "abc", "employee_id": 1, "user_id": 10}"#,
    );
    shell.respond("/employee/", 500, "boom");
    shell.elapse_timers();

    assert_eq!(shell.model.current_route(), Some(routes::ERROR));
    assert_matches!(shell.view().screen, ScreenView::Error { show_close_button: false, .. });

    // Late answers after the failure must not pull the user back to main.
    shell.respond("/my-valentines/", 200, "[]");
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::ERROR));
}

#[test]
fn wizard_creates_valentine_and_lists_it() {
    let mut shell = booted(NOT_UP_TIME);

    shell.navigate(routes::CHOSE_EMPLOYEE);
    let ScreenView::ChoseEmployee { employees, selected } = shell.view().screen else {
        panic!("expected employee step");
    };
    let ids: Vec<EmployeeId> = employees.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![EmployeeId(2), EmployeeId(3)]);
    assert_eq!(selected, None);
    assert_eq!(shell.view().bottom_bar.state, BarState::Hidden);

    shell.send(Event::EmployeeToggled { id: EmployeeId(2) });
    assert_eq!(shell.view().bottom_bar.items, vec![BarItem::text(labels::NEXT)]);
    shell.click();
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::CHOSE_IMAGE));

    let ScreenView::ChoseImage { slides, active, .. } = shell.view().screen else {
        panic!("expected image step");
    };
    assert_eq!(slides.len(), 2);
    assert_matches!(slides[1], Slide::Upload);
    assert_eq!(active, 0);
    shell.click();
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::WRITE_TEXT));

    shell.send(Event::TextChanged { text: "Люб".into() });
    assert_eq!(shell.view().bottom_bar.state, BarState::Hidden);
    shell.send(Event::TextChanged {
        text: "С праздником!".into(),
    });
    assert_eq!(shell.view().bottom_bar.state, BarState::Idle);
    shell.click();
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::SENDING_PRIVACY));

    shell.send(Event::PrivacyModeChanged {
        mode: PrivacyMode::Public,
    });
    shell.click();
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::CHECK));
    assert_matches!(
        shell.view().screen,
        ScreenView::Check { ref sender_line, ref text, .. }
            if sender_line == "от Вашего имени" && text == "С праздником!"
    );

    shell.click();
    assert_eq!(shell.view().bottom_bar.state, BarState::Loading);
    let created = shell.respond(
        "/my-valentines/",
        201,
        r#"{"id": 40, "sender": 1, "recipient": 2, "image": 5,
            "text": "С праздником!", "is_anonymously": false}"#,
    );
    assert_eq!(created.method(), HttpMethod::Post);
    let payload: serde_json::Value = serde_json::from_slice(created.body()).unwrap();
    assert_eq!(payload["recipient"], 2);
    assert_eq!(payload["image"], 5);
    assert_eq!(payload["is_anonymously"], false);

    // Response alone does not finish the save; the loading state stays until the timer.
    assert_eq!(shell.model.current_route(), Some(routes::CHECK));
    assert_eq!(shell.view().bottom_bar.state, BarState::Loading);

    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::MY_VALENTINES_LIST));
    let view = shell.view();
    let ScreenView::MyValentines { items, empty_message } = view.screen else {
        panic!("expected sent list");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ValentineId(40));
    assert_eq!(items[0].recipient_name, "Анна Петрова");
    assert!(empty_message.is_none());
    assert_eq!(view.bottom_bar.items, vec![BarItem::text(labels::SEND_ANOTHER)]);

    shell.click();
    shell.elapse_timers();
    let ScreenView::ChoseEmployee { employees, .. } = shell.view().screen else {
        panic!("expected employee step");
    };
    let ids: Vec<EmployeeId> = employees.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![EmployeeId(3)]);
}

fn recipient_ids(shell: &Shell) -> Vec<EmployeeId> {
    let ScreenView::ChoseEmployee { employees, .. } = shell.view().screen else {
        panic!("expected employee step");
    };
    employees.iter().map(|e| e.id).collect()
}

#[test]
fn deleted_valentine_frees_its_recipient() {
    let sent = r#"[{"id": 12, "sender": 1, "recipient": 2, "image": 5, "text": "Привет"}]"#;
    let mut shell = booted_with(sent, NOT_UP_TIME);

    shell.navigate(routes::CHOSE_EMPLOYEE);
    assert_eq!(recipient_ids(&shell), vec![EmployeeId(3)]);

    shell.navigate(routes::MY_VALENTINES_LIST);
    shell.send(Event::DeleteRequested { id: ValentineId(12) });
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::MY_VALENTINES_DELETE));
    shell.click();
    let deleted = shell.respond("/my-valentines/12/", 204, "");
    assert_eq!(deleted.method(), HttpMethod::Delete);
    shell.elapse_timers();
    assert_matches!(
        shell.view().screen,
        ScreenView::MyValentines { ref items, .. } if items.is_empty()
    );

    shell.navigate(routes::CHOSE_EMPLOYEE);
    assert_eq!(recipient_ids(&shell), vec![EmployeeId(2), EmployeeId(3)]);
}

#[test]
fn anonymous_card_carries_signature() {
    let mut shell = booted(NOT_UP_TIME);
    shell.navigate(routes::CHOSE_EMPLOYEE);
    shell.send(Event::EmployeeToggled { id: EmployeeId(3) });
    shell.click();
    shell.elapse_timers();
    shell.click();
    shell.elapse_timers();
    shell.send(Event::TextChanged {
        text: "Спасибо за помощь".into(),
    });
    shell.click();
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::SENDING_PRIVACY));

    assert_matches!(
        shell.view().screen,
        ScreenView::SendingPrivacy { mode: PrivacyMode::Public, ref signature, .. }
            if signature.is_empty()
    );
    assert_eq!(shell.view().bottom_bar.state, BarState::Idle);

    shell.send(Event::PrivacyModeChanged {
        mode: PrivacyMode::Anonymous,
    });
    assert_eq!(shell.view().bottom_bar.state, BarState::Hidden);
    shell.send(Event::SignatureChanged {
        signature: "Коллега".into(),
    });
    assert_eq!(shell.view().bottom_bar.state, BarState::Idle);
    shell.click();
    shell.elapse_timers();
    assert_matches!(
        shell.view().screen,
        ScreenView::Check { ref sender_line, .. } if sender_line == "анонимно от Коллега"
    );

    shell.click();
    let created = shell.respond(
        "/my-valentines/",
        201,
        r#"{"id": 41, "sender": 1, "recipient": 3, "image": 5, "text": "Спасибо за помощь",
            "is_anonymously": true, "anonymous_signature": "Коллега"}"#,
    );
    let payload: serde_json::Value = serde_json::from_slice(created.body()).unwrap();
    assert_eq!(payload["is_anonymously"], true);
    assert_eq!(payload["anonymous_signature"], "Коллега");

    shell.elapse_timers();
    let ScreenView::MyValentines { items, .. } = shell.view().screen else {
        panic!("expected sent list");
    };
    assert_eq!(items[0].signature_line, "анонимно от Коллега");
}

#[test]
fn uploaded_image_becomes_active_slide() {
    let mut shell = booted(NOT_UP_TIME);
    shell.navigate(routes::CHOSE_EMPLOYEE);
    shell.send(Event::EmployeeToggled { id: EmployeeId(3) });
    shell.click();
    shell.elapse_timers();

    shell.send(Event::FileChosen {
        file: valentine_shared::model::UploadFile {
            file_name: "heart.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        },
    });
    assert_eq!(shell.view().bottom_bar.state, BarState::Idle);
    shell.click();
    assert_eq!(shell.view().bottom_bar.state, BarState::Loading);

    // Carousel is locked while uploading.
    shell.send(Event::CarouselPrev);
    assert_matches!(shell.view().screen, ScreenView::ChoseImage { active: 1, .. });

    let upload = shell.respond(
        "/load-valentine-image/",
        201,
        r#"{"id": 6, "image": "/media/6.png", "owner": 10}"#,
    );
    assert!(upload
        .header("Content-Type")
        .is_some_and(|v| v.starts_with("multipart/form-data")));
    assert_eq!(shell.view().bottom_bar.state, BarState::Loading);

    shell.elapse_timers();
    let ScreenView::ChoseImage {
        slides,
        active,
        preview,
        error,
    } = shell.view().screen
    else {
        panic!("expected image step");
    };
    assert_eq!(slides.len(), 3);
    assert_eq!(active, 1);
    assert!(preview.is_none());
    assert!(error.is_none());
    assert_eq!(shell.view().bottom_bar.items, vec![BarItem::text(labels::NEXT)]);
}

#[test]
fn late_upload_skips_a_fresh_visit_of_its_screen() {
    let mut shell = booted(NOT_UP_TIME);
    shell.navigate(routes::CHOSE_IMAGE);
    shell.send(Event::FileChosen {
        file: valentine_shared::model::UploadFile {
            file_name: "heart.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        },
    });
    shell.click();
    assert_eq!(shell.view().bottom_bar.state, BarState::Loading);

    shell.navigate(routes::MAIN);
    shell.navigate(routes::CHOSE_IMAGE);
    assert_eq!(shell.view().bottom_bar.items, vec![BarItem::text(labels::NEXT)]);

    shell.respond(
        "/load-valentine-image/",
        201,
        r#"{"id": 6, "image": "/media/6.png", "owner": 10}"#,
    );
    shell.elapse_timers();

    let ScreenView::ChoseImage {
        slides,
        active,
        error,
        ..
    } = shell.view().screen
    else {
        panic!("expected image step");
    };
    // Stored, but the new visit keeps its own position.
    assert_eq!(slides.len(), 3);
    assert_eq!(active, 0);
    assert!(error.is_none());
    assert_eq!(shell.view().bottom_bar.state, BarState::Idle);
}

#[test]
fn deleting_unknown_valentine_sends_nothing() {
    let mut shell = booted(NOT_UP_TIME);
    shell.navigate(routes::MY_VALENTINES_LIST);
    shell.send(Event::DeleteRequested { id: ValentineId(99) });
    shell.elapse_timers();
    assert_eq!(shell.model.current_route(), Some(routes::MY_VALENTINES_DELETE));

    shell.click();
    assert!(shell.http_urls().is_empty());
    assert_eq!(shell.view().bottom_bar.state, BarState::Idle);
    assert_matches!(
        shell.view().screen,
        ScreenView::MyValentineDelete { card: None, error: Some(_) }
    );
}

#[test]
fn received_before_holiday_waits() {
    let mut shell = booted(NOT_UP_TIME);
    shell.navigate(routes::RECEIVED_LIST);

    assert_eq!(
        shell.http_urls(),
        vec![format!("{BASE}/my-valentines/received/")]
    );
    assert_matches!(
        shell.view().screen,
        ScreenView::Received { state: ReceivedState::Loading, .. }
    );

    shell.respond(
        "/my-valentines/received/",
        200,
        r#"{"is_up_time": false, "valentines": [
            {"id": 7, "sender": 2, "recipient": 1, "image": 5, "text": "Секрет"}
        ]}"#,
    );
    assert_eq!(
        shell.view().screen,
        ScreenView::Received {
            state: ReceivedState::Wait,
            error: None
        }
    );
}

#[test]
fn opening_received_card_marks_it_read() {
    let received = r#"{"is_up_time": true, "valentines": [
        {"id": 7, "sender": 2, "recipient": 1, "image": 5, "text": "Привет",
         "is_anonymously": true, "anonymous_signature": "Тайный друг"}
    ]}"#;
    let mut shell = booted(received);
    shell.navigate(routes::RECEIVED_LIST);
    shell.respond("/my-valentines/received/", 200, received);

    let ScreenView::Received {
        state: ReceivedState::Cards { cards },
        ..
    } = shell.view().screen
    else {
        panic!("expected cards");
    };
    assert_eq!(cards.len(), 1);
    assert!(cards[0].is_anonymous);
    assert!(!cards[0].is_read);

    shell.send(Event::ValentineSelected { id: ValentineId(7) });
    shell.elapse_timers();
    let mark = shell.respond("/my-valentines/7/mark-read/", 200, "{}");
    assert_eq!(mark.method(), HttpMethod::Post);
    assert_matches!(
        shell.view().screen,
        ScreenView::ReceivedDetail { card: Some(ref card) } if card.is_read
    );

    // Already read: no second request.
    let already_read = received.replace("\"text\": \"Привет\"", "\"text\": \"Привет\", \"is_read_by_recipient\": true");
    shell.send(Event::BackRequested);
    shell.elapse_timers();
    shell.respond("/my-valentines/received/", 200, &already_read);
    shell.send(Event::ValentineSelected { id: ValentineId(7) });
    shell.elapse_timers();
    assert!(shell.http_urls().is_empty());
}

#[test]
fn navigation_during_fade_is_queued_last_wins() {
    let mut shell = booted(NOT_UP_TIME);

    shell.send(Event::NavigationTriggered {
        route: routes::ABOUT.into(),
    });
    assert_eq!(
        shell.view().transition,
        TransitionState::FadingOut {
            to: routes::ABOUT.into()
        }
    );
    // The old screen stays on display during the exit fade.
    assert_eq!(shell.view().route.as_deref(), Some(routes::MAIN));

    shell.send(Event::NavigationTriggered {
        route: routes::RECEIVED_LIST.into(),
    });
    shell.send(Event::NavigationTriggered {
        route: routes::CHOSE_EMPLOYEE.into(),
    });
    shell.elapse_timers();

    let view = shell.view();
    assert_eq!(view.route.as_deref(), Some(routes::CHOSE_EMPLOYEE));
    assert_eq!(view.transition, TransitionState::Idle);
    assert!(shell.http_urls().is_empty());
}

#[test]
fn unknown_route_reports_error() {
    let mut shell = booted(NOT_UP_TIME);
    shell.navigate("nowhere");

    assert_eq!(shell.model.current_route(), Some(routes::MAIN));
    let error = shell.view().error.expect("navigation error");
    assert_eq!(error.error_code, "NOT_FOUND");

    shell.send(Event::ErrorDismissed);
    assert!(shell.view().error.is_none());
}
