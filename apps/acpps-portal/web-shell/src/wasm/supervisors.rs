use super::*;

use acpps_client_core::acceptance::{AcceptanceIndicator, ToggleOutcome};
use acpps_client_core::api::{
    CapacityUpdateRequest, decode_capacity_response, decode_toggle_response,
};
use acpps_client_core::capacity::{CapacityView, CommitDecision};
use acpps_client_core::config::ROW_ID_PLACEHOLDER;
use acpps_client_core::error::ClientError;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Toggle,
    Capacity,
}

pub(super) fn install(table_body: &Element) -> Result<(), String> {
    let endpoints = RowEndpoints {
        toggle: row_template(table_body, ATTR_TOGGLE_URL),
        capacity: row_template(table_body, ATTR_CAPACITY_URL),
    };
    ROW_ENDPOINTS.with(|slot| *slot.borrow_mut() = Some(endpoints));

    install_acceptance_toggles(table_body)?;
    install_capacity_editors(table_body)
}

fn row_template(table_body: &Element, attribute: &str) -> Option<UrlTemplate> {
    let Some(raw) = table_body.get_attribute(attribute) else {
        warn!(attribute, "supervisor table has no endpoint attribute");
        return None;
    };
    match UrlTemplate::from_attribute(&raw, ROW_ID_PLACEHOLDER) {
        Ok(template) => Some(template),
        Err(error) => {
            warn!(attribute, %error, "ignoring unusable endpoint template");
            None
        }
    }
}

fn row_url(endpoint: Endpoint, key: &ControlKey) -> Result<String, ClientError> {
    ROW_ENDPOINTS.with(|slot| {
        let endpoints = slot.borrow();
        let template = endpoints
            .as_ref()
            .and_then(|endpoints| match endpoint {
                Endpoint::Toggle => endpoints.toggle.as_ref(),
                Endpoint::Capacity => endpoints.capacity.as_ref(),
            })
            .ok_or_else(|| {
                ClientError::validation(format!("{endpoint:?} endpoint is not configured"))
            })?;
        template
            .render_one(ROW_ID_PLACEHOLDER, key.as_str())
            .map_err(|error| ClientError::validation(error.to_string()))
    })
}

fn install_acceptance_toggles(table_body: &Element) -> Result<(), String> {
    let controls = query_all(table_body, TOGGLE_ACCEPTANCE_SELECTOR)?;
    ACCEPTANCE_CLICK_HANDLERS.with(|slot| {
        let mut handlers = slot.borrow_mut();
        if !handlers.is_empty() {
            return;
        }
        for control in controls {
            let Some(row_id) = control.get_attribute(ATTR_SUPERVISOR_ID) else {
                warn!("acceptance control has no supervisor id");
                continue;
            };
            let key = ControlKey::from(row_id);
            let target = control.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
                move |event: web_sys::Event| {
                    event.prevent_default();
                    toggle_acceptance(target.clone(), key.clone());
                },
            ));
            let _ = control
                .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            handlers.push(callback);
        }
    });
    Ok(())
}

fn toggle_acceptance(control: Element, key: ControlKey) {
    let started = ACCEPTANCE_TOGGLES.with(|toggles| toggles.borrow_mut().begin(&key));
    if !started {
        return;
    }

    spawn_local(async move {
        let result = match row_url(Endpoint::Toggle, &key) {
            Ok(url) => post_empty(&url)
                .await
                .and_then(|raw| decode_toggle_response(raw.status, &raw.body)),
            Err(error) => Err(error),
        };
        if let Err(error) = &result {
            warn!(row = %key, %error, "acceptance toggle failed");
        }

        let outcome = ACCEPTANCE_TOGGLES.with(|toggles| toggles.borrow_mut().finish(&key, result));
        match outcome {
            ToggleOutcome::Indicator(indicator) => {
                if let Err(error) = render_indicator(&control, indicator) {
                    warn!(row = %key, %error, "failed to render acceptance indicator");
                }
            }
            ToggleOutcome::Alert(message) => alert(&message),
        }
    });
}

fn render_indicator(control: &Element, indicator: AcceptanceIndicator) -> Result<(), String> {
    let container = control
        .query_selector("span")
        .ok()
        .flatten()
        .ok_or_else(|| "acceptance control has no indicator span".to_string())?;
    let icon = document()?
        .create_element("i")
        .map_err(|_| "failed to create indicator icon".to_string())?;
    icon.set_class_name(indicator.icon_class());
    container.set_class_name(indicator.container_class());
    container.set_inner_html("");
    append(&container, &icon)
}

/// DOM handles for one capacity cell.
#[derive(Clone)]
struct CapacityCell {
    key: ControlKey,
    display: HtmlElement,
    input: HtmlInputElement,
}

fn install_capacity_editors(table_body: &Element) -> Result<(), String> {
    if CAPACITY_EVENT_HANDLERS.with(|slot| !slot.borrow().is_empty()) {
        return Ok(());
    }
    for cell in query_all(table_body, CAPACITY_CELL_SELECTOR)? {
        if let Err(error) = install_capacity_cell(&cell) {
            warn!(%error, "skipping capacity cell");
        }
    }
    debug!(
        editors = CAPACITY_EDITORS.with(|editors| editors.borrow().len()),
        "capacity editors installed"
    );
    Ok(())
}

fn install_capacity_cell(cell: &Element) -> Result<(), String> {
    let key = cell
        .get_attribute(ATTR_SUPERVISOR_ID)
        .map(ControlKey::from)
        .ok_or_else(|| "capacity cell has no supervisor id".to_string())?;
    let display = query_html(cell, CAPACITY_DISPLAY_SELECTOR)
        .ok_or_else(|| format!("capacity cell {key} has no display span"))?;
    let input = cell
        .query_selector(CAPACITY_INPUT_SELECTOR)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        .ok_or_else(|| format!("capacity cell {key} has no input"))?;

    let displayed = display.text_content().unwrap_or_default().trim().to_string();
    CAPACITY_EDITORS.with(|editors| editors.borrow_mut().register(key.clone(), displayed));
    let cell = CapacityCell {
        key,
        display,
        input,
    };

    let on_click = {
        let cell = cell.clone();
        Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let view = CAPACITY_EDITORS.with(|editors| {
                editors
                    .borrow_mut()
                    .get_mut(&cell.key)
                    .and_then(|editor| editor.open())
            });
            if let Some(view) = view {
                apply_capacity_view(&cell, &view);
            }
        }))
    };
    let on_blur = {
        let cell = cell.clone();
        Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            commit_capacity(&cell);
        }))
    };
    let on_keydown = {
        let cell = cell.clone();
        Closure::<dyn FnMut(web_sys::KeyboardEvent)>::wrap(Box::new(
            move |event: web_sys::KeyboardEvent| match event.key().as_str() {
                "Enter" => {
                    event.prevent_default();
                    // The blur handler performs the commit.
                    let _ = cell.input.blur();
                }
                "Escape" => {
                    let view = CAPACITY_EDITORS.with(|editors| {
                        editors
                            .borrow_mut()
                            .get_mut(&cell.key)
                            .and_then(|editor| editor.escape())
                    });
                    if let Some(view) = view {
                        apply_capacity_view(&cell, &view);
                    }
                }
                _ => {}
            },
        ))
    };

    let _ = cell
        .display
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
    let _ = cell
        .input
        .add_event_listener_with_callback("blur", on_blur.as_ref().unchecked_ref());
    let _ = cell
        .input
        .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());

    CAPACITY_EVENT_HANDLERS.with(|slot| slot.borrow_mut().extend([on_click, on_blur]));
    CAPACITY_KEYDOWN_HANDLERS.with(|slot| slot.borrow_mut().push(on_keydown));
    Ok(())
}

fn commit_capacity(cell: &CapacityCell) {
    let value = cell.input.value();
    let decision = CAPACITY_EDITORS.with(|editors| {
        editors
            .borrow_mut()
            .get_mut(&cell.key)
            .map_or(CommitDecision::Ignored, |editor| editor.commit(&value))
    });

    match decision {
        CommitDecision::Ignored => {}
        CommitDecision::Unchanged(view) => apply_capacity_view(cell, &view),
        CommitDecision::Submit { capacity } => {
            let cell = cell.clone();
            spawn_local(async move {
                let result = match row_url(Endpoint::Capacity, &cell.key) {
                    Ok(url) => post_json(&url, &CapacityUpdateRequest { capacity })
                        .await
                        .and_then(|raw| decode_capacity_response(raw.status, &raw.body)),
                    Err(error) => Err(error),
                };
                if let Err(error) = &result {
                    warn!(row = %cell.key, %error, "capacity update failed");
                }

                let settled = CAPACITY_EDITORS.with(|editors| {
                    editors
                        .borrow_mut()
                        .get_mut(&cell.key)
                        .map(|editor| editor.settle(result))
                });
                let Some(settled) = settled else {
                    return;
                };
                if let Some(message) = &settled.alert {
                    alert(message);
                }
                apply_capacity_view(&cell, &settled.view);
            });
        }
    }
}

/// Callers must not hold a `CAPACITY_EDITORS` borrow: hiding or focusing the
/// input can dispatch `blur` synchronously.
fn apply_capacity_view(cell: &CapacityCell, view: &CapacityView) {
    if let Some(value) = &view.input_value {
        cell.input.set_value(value);
    }
    cell.display.set_text_content(Some(&view.display_text));

    if view.editing {
        set_display(&cell.display, DISPLAY_NONE);
        set_display(&cell.input, DISPLAY_INLINE_BLOCK);
        if view.focus_input {
            let _ = cell.input.focus();
            cell.input.select();
        }
    } else {
        set_display(&cell.input, DISPLAY_NONE);
        set_display(&cell.display, DISPLAY_INLINE_BLOCK);
    }
}
