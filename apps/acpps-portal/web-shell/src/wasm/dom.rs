use super::*;

use acpps_client_core::task::{
    BannerBody, ButtonLabel, ButtonView, POLLING_NOTICE, STARTING_LABEL, StatusBanner,
    task_initiated_line,
};
use web_sys::{Document, HtmlButtonElement, HtmlDocument, HtmlSelectElement, Window};

pub(super) fn window() -> Result<Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable".to_string())
}

pub(super) fn document() -> Result<Document, String> {
    window()?
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

/// Runs `boot` now, or on `DOMContentLoaded` while the document is still parsing.
pub(super) fn run_when_dom_ready(boot: fn()) -> Result<(), String> {
    let document = document()?;
    let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default();
    if boot_can_run(&ready_state) {
        boot();
        return Ok(());
    }

    DOM_READY_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            boot();
        }));
        document
            .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to listen for DOMContentLoaded".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

pub(super) fn body_attribute(name: &str) -> Option<String> {
    document().ok()?.body()?.get_attribute(name)
}

pub(super) fn cookie_header() -> Option<String> {
    document()
        .ok()?
        .dyn_into::<HtmlDocument>()
        .ok()?
        .cookie()
        .ok()
}

pub(super) fn html_element_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub(super) fn query_all(root: &Element, selector: &str) -> Result<Vec<Element>, String> {
    let nodes = root
        .query_selector_all(selector)
        .map_err(|_| format!("invalid selector `{selector}`"))?;
    Ok((0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub(super) fn query_html(root: &Element, selector: &str) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub(super) fn set_display(element: &HtmlElement, value: &str) {
    let _ = element.style().set_property("display", value);
}

/// Current value of an `<input>` or `<select>`.
pub(super) fn control_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    element
        .dyn_ref::<HtmlSelectElement>()
        .map(HtmlSelectElement::value)
}

pub(super) fn alert(message: &str) {
    match window() {
        Ok(window) => {
            let _ = window.alert_with_message(message);
        }
        Err(error) => warn!(%error, %message, "could not show alert"),
    }
}

pub(super) fn current_href() -> Result<String, String> {
    window()?
        .location()
        .href()
        .map_err(|_| "location href is unavailable".to_string())
}

pub(super) fn navigate_to(href: &str) {
    let result = window().and_then(|window| {
        window
            .location()
            .set_href(href)
            .map_err(|_| format!("failed to navigate to {href}"))
    });
    if let Err(error) = result {
        error!(%error, "navigation failed");
    }
}

pub(super) fn reload_page() {
    let result = window().and_then(|window| {
        window
            .location()
            .reload()
            .map_err(|_| "failed to reload page".to_string())
    });
    if let Err(error) = result {
        error!(%error, "reload failed");
    }
}

pub(super) fn spinner(document: &Document) -> Result<Element, String> {
    let spinner = document
        .create_element("span")
        .map_err(|_| "failed to create spinner".to_string())?;
    spinner.set_class_name(SPINNER_CLASS);
    let _ = spinner.set_attribute("role", "status");
    let _ = spinner.set_attribute("aria-hidden", "true");
    Ok(spinner)
}

pub(super) fn render_button(button: &HtmlElement, view: &ButtonView) -> Result<(), String> {
    if let Some(element) = button.dyn_ref::<HtmlButtonElement>() {
        element.set_disabled(view.disabled);
    } else if view.disabled {
        let _ = button.set_attribute("disabled", "");
    } else {
        let _ = button.remove_attribute("disabled");
    }

    match &view.label {
        ButtonLabel::Original(markup) => button.set_inner_html(markup),
        ButtonLabel::Starting => {
            let document = document()?;
            button.set_inner_html("");
            append(button, &spinner(&document)?)?;
            append_text(&document, button, &format!(" {STARTING_LABEL}"))?;
        }
    }
    Ok(())
}

/// Server text always lands in text nodes, never in markup.
pub(super) fn render_banner(area: &HtmlElement, banner: &StatusBanner) -> Result<(), String> {
    area.set_class_name(banner.tone.class_name());
    match &banner.body {
        BannerBody::Text(text) => area.set_text_content(Some(text)),
        BannerBody::Polling { task_id } => {
            let document = document()?;
            area.set_inner_html("");
            append_text(&document, area, &task_initiated_line(task_id))?;
            let line_break = document
                .create_element("br")
                .map_err(|_| "failed to create line break".to_string())?;
            append(area, &line_break)?;
            append_text(&document, area, &format!("{POLLING_NOTICE} "))?;
            append(area, &spinner(&document)?)?;
        }
    }
    Ok(())
}

pub(super) fn append(parent: &Element, child: &Element) -> Result<(), String> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|_| "failed to append element".to_string())
}

fn append_text(document: &Document, parent: &Element, text: &str) -> Result<(), String> {
    parent
        .append_child(&document.create_text_node(text))
        .map(|_| ())
        .map_err(|_| "failed to append text".to_string())
}
