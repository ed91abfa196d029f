use super::*;

use acpps_client_core::api::{StartFailure, decode_task_start};
use acpps_client_core::config::task_status_template;
use acpps_client_core::launcher::{TaskForm, TaskKind};
use acpps_client_core::poll::{PollOutcome, PollTicket, run_poll_loop};
use acpps_client_core::task::TaskEffect;
use gloo_timers::future::sleep;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

/// Elements and endpoints one task button works with.
#[derive(Clone)]
struct TaskSurface {
    kind: TaskKind,
    key: ControlKey,
    button: HtmlElement,
    status_area: Option<HtmlElement>,
    status_template: UrlTemplate,
}

pub(super) fn present_task_kinds(document: &Document) -> Vec<TaskKind> {
    TaskKind::ALL
        .into_iter()
        .filter(|kind| document.get_element_by_id(kind.button_id()).is_some())
        .collect()
}

pub(super) fn install(document: &Document) -> Result<(), String> {
    let reload_delay = page_config().reload_delay;
    TASK_CLICK_HANDLERS.with(|slot| {
        let mut handlers = slot.borrow_mut();
        if !handlers.is_empty() {
            return Ok(());
        }
        for kind in present_task_kinds(document) {
            let Some(button) = html_element_by_id(document, kind.button_id()) else {
                continue;
            };
            let status_area = html_element_by_id(document, kind.status_id());
            if status_area.is_none() {
                warn!(
                    task = kind.as_str(),
                    status_id = kind.status_id(),
                    "task button has no status area"
                );
            }
            let status_template =
                match task_status_template(button.get_attribute(ATTR_STATUS_URL).as_deref()) {
                    Ok(template) => template,
                    Err(error) => {
                        warn!(task = kind.as_str(), %error, "unusable status url; button left unbound");
                        continue;
                    }
                };

            let key = ControlKey::from(kind.button_id());
            TASK_REGISTRY.with(|registry| {
                registry.borrow_mut().register(key.clone(), reload_delay);
            });
            let surface = TaskSurface {
                kind,
                key,
                button: button.clone(),
                status_area,
                status_template,
            };
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
                move |event: web_sys::Event| {
                    event.prevent_default();
                    start_task(&surface);
                },
            ));
            button
                .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
                .map_err(|_| format!("failed to bind {}", kind.button_id()))?;
            handlers.push(callback);
        }
        Ok::<(), String>(())
    })?;
    install_page_hide_handler()
}

fn install_page_hide_handler() -> Result<(), String> {
    PAGE_HIDE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let cancelled = TASK_REGISTRY.with(|registry| registry.borrow_mut().cancel_all());
            if cancelled > 0 {
                debug!(cancelled, "stopped task polling on page hide");
            }
        }));
        window()?
            .add_event_listener_with_callback("pagehide", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to listen for pagehide".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

fn read_task_form() -> TaskForm {
    let value_of = |id: &str| {
        document()
            .ok()
            .and_then(|document| document.get_element_by_id(id))
            .and_then(|element| control_value(&element))
    };
    TaskForm {
        semester: value_of(SEMESTER_INPUT_ID),
        weightage: value_of(WEIGHTAGE_INPUT_ID),
    }
}

fn start_task(surface: &TaskSurface) {
    let task = surface.kind.as_str();
    let request = match surface.kind.start_request(&read_task_form()) {
        Ok(request) => request,
        Err(error) => {
            debug!(task, %error, "task start blocked by form validation");
            alert(&error.to_string());
            return;
        }
    };
    let Some(url) = surface
        .button
        .get_attribute(ATTR_URL)
        .filter(|url| !url.trim().is_empty())
    else {
        warn!(task, "task button has no data-url");
        return;
    };

    let original_label = surface.button.inner_html();
    let started = TASK_REGISTRY.with(|registry| {
        registry
            .borrow_mut()
            .begin_start(&surface.key, &original_label)
    });
    let effects = match started {
        Ok(effects) => effects,
        Err(error) => {
            debug!(task, %error, "ignoring task activation");
            return;
        }
    };
    apply_effects(surface, effects);

    let surface = surface.clone();
    spawn_local(async move {
        let result = post_task_start(&url, request)
            .await
            .map_err(|error| StartFailure::Network(error.to_string()))
            .and_then(|raw| decode_task_start(raw.status, &raw.body));
        let effects = TASK_REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .on_start_result(&surface.key, result)
        });
        match effects {
            Ok(effects) => apply_effects(&surface, effects),
            Err(error) => warn!(task = surface.kind.as_str(), %error, "dropping start response"),
        }
    });
}

fn apply_effects(surface: &TaskSurface, effects: Vec<TaskEffect>) {
    for effect in effects {
        let applied = match effect {
            TaskEffect::Button(view) => render_button(&surface.button, &view),
            TaskEffect::Banner(banner) => surface
                .status_area
                .as_ref()
                .map_or(Ok(()), |area| render_banner(area, &banner)),
            TaskEffect::StartPolling(ticket) => {
                spawn_poll(surface.clone(), ticket);
                Ok(())
            }
            TaskEffect::ScheduleReload(delay) => {
                spawn_local(async move {
                    sleep(delay).await;
                    reload_page();
                });
                Ok(())
            }
        };
        if let Err(error) = applied {
            warn!(task = surface.kind.as_str(), %error, "failed to apply task effect");
        }
    }
}

fn spawn_poll(surface: TaskSurface, ticket: PollTicket) {
    let interval = page_config().poll_interval;
    spawn_local(async move {
        let source = HttpTaskStatusSource {
            template: surface.status_template.clone(),
        };
        let mut ticker = IntervalTicker::new(interval);
        let outcome = run_poll_loop(&source, &mut ticker, &ticket).await;
        if let PollOutcome::StatusUnavailable(error) = &outcome {
            warn!(task_id = %ticket.task_id, %error, "task status unavailable");
        }

        let effects = TASK_REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .on_poll_outcome(&surface.key, outcome)
        });
        match effects {
            Ok(effects) => apply_effects(&surface, effects),
            Err(error) => warn!(task_id = %ticket.task_id, %error, "dropping poll outcome"),
        }
    });
}
