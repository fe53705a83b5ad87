//! GseaApp - page coordinator wired to the worker unit and the view.

use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::PageTransitionEvent;
use zoon::*;

use crate::form::{FormFields, form_panel};
use crate::results::{results_panel, status_line};
use crate::worker_unit::WebWorkerUnit;
use shared::{Coordinator, Outcome, PageConfig, Phase, ResultView, UnitEvent, UnitHandle};

type SharedCoordinator<U> = Rc<RefCell<Coordinator<U>>>;

/// Signals the page renders from. Written only through [`PageState::apply`].
#[derive(Clone, Default)]
pub struct PageState {
    pub phase: Mutable<Phase>,
    pub run_enabled: Mutable<bool>,
    pub view: Mutable<ResultView>,
}

impl PageState {
    pub fn apply(&self, phase: Phase, outcome: Outcome) {
        self.phase.set_neq(phase);
        self.run_enabled.set_neq(phase == Phase::Ready);
        match outcome {
            Outcome::Render(view) => self.view.set(view),
            Outcome::Unchanged => {}
            Outcome::Ignored(reason) => zoon::println!("Ignored: {}", reason),
        }
    }
}

/// Feeds every unit event through the coordinator, in arrival order.
pub async fn drive_events<U: UnitHandle>(
    coordinator: SharedCoordinator<U>,
    state: PageState,
    mut events: UnboundedReceiver<UnitEvent>,
) {
    while let Some(event) = events.next().await {
        let (phase, outcome) = {
            let mut coordinator = coordinator.borrow_mut();
            let outcome = coordinator.on_event(event);
            (coordinator.phase(), outcome)
        };
        state.apply(phase, outcome);
    }
}

pub struct GseaApp {
    pub fields: FormFields,
    pub state: PageState,
    coordinator: SharedCoordinator<WebWorkerUnit>,
    _event_loop: TaskHandle,
}

impl GseaApp {
    /// Spawns the worker and starts listening to it. The page is usable
    /// immediately; the run control stays disabled until `ready`.
    pub fn new(config: PageConfig) -> Self {
        let fields = FormFields::new(&config.defaults);
        let state = PageState::default();
        let (unit, events) = WebWorkerUnit::new(config);
        let coordinator = Rc::new(RefCell::new(Coordinator::new(unit)));

        let event_loop = Task::start_droppable(drive_events(
            coordinator.clone(),
            state.clone(),
            events,
        ));

        let outcome = coordinator.borrow_mut().start();
        let phase = coordinator.borrow().phase();
        state.apply(phase, outcome);

        register_teardown(coordinator.clone(), state.clone());

        Self {
            fields,
            state,
            coordinator,
            _event_loop: event_loop,
        }
    }

    fn on_run(&self) -> impl FnMut() + 'static {
        let coordinator = self.coordinator.clone();
        let fields = self.fields.clone();
        let state = self.state.clone();
        move || {
            let input = fields.snapshot();
            let (phase, outcome) = {
                let mut coordinator = coordinator.borrow_mut();
                let outcome = coordinator.submit(&input);
                (coordinator.phase(), outcome)
            };
            state.apply(phase, outcome);
        }
    }

    pub fn root(&self) -> impl Element {
        Column::new()
            .s(Width::fill())
            .s(Padding::all(24))
            .s(Gap::new().y(16))
            .s(Font::new().family([
                FontFamily::new("Inter"),
                FontFamily::new("system-ui"),
                FontFamily::new("Segoe UI"),
                FontFamily::new("Arial"),
                FontFamily::SansSerif,
            ]))
            .item(
                El::new()
                    .s(Font::new().size(22).weight(FontWeight::Bold))
                    .child(Text::new("GSEA prerank")),
            )
            .item(status_line(self.state.phase.signal()))
            .item(form_panel(
                &self.fields,
                &self.state.run_enabled,
                self.on_run(),
            ))
            .item(results_panel(self.state.view.signal_cloned()))
    }
}

/// Terminates the unit and shows the page as unavailable.
pub fn shut_down<U: UnitHandle>(coordinator: &SharedCoordinator<U>, state: &PageState) {
    let phase = {
        let mut coordinator = coordinator.borrow_mut();
        coordinator.teardown();
        coordinator.phase()
    };
    state.apply(phase, Outcome::Unchanged);
}

/// Terminates the worker when the page goes away for good. A page entering
/// the back/forward cache keeps its worker and comes back usable.
fn register_teardown<U: UnitHandle + 'static>(coordinator: SharedCoordinator<U>, state: PageState) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_pagehide = Closure::<dyn FnMut(PageTransitionEvent)>::new(
        move |event: PageTransitionEvent| {
            if !event.persisted() {
                shut_down(&coordinator, &state);
            }
        },
    );
    if let Err(error) = window
        .add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())
    {
        zoon::println!("Failed to register pagehide listener: {:?}", error);
    }
    on_pagehide.forget();
}
