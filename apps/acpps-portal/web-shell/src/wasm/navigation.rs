use super::*;

use acpps_client_core::filter::semester_filter_target;
use acpps_client_core::redirect::redirect_target;

pub(super) fn install_semester_filter(select: &Element) -> Result<(), String> {
    SEMESTER_FILTER_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let source = select.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            apply_semester_filter(&source);
        }));
        select
            .add_event_listener_with_callback("change", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to bind semester filter".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

fn apply_semester_filter(select: &Element) {
    let selected = control_value(select).unwrap_or_default();
    let target = current_href().and_then(|href| {
        semester_filter_target(&href, &selected).map_err(|error| error.to_string())
    });
    match target {
        Ok(target) => {
            debug!(semester = %selected, %target, "applying semester filter");
            navigate_to(&target);
        }
        Err(error) => warn!(%error, "semester filter could not build target url"),
    }
}

pub(super) fn install_profile_redirect(button: &Element) -> Result<(), String> {
    PROFILE_REDIRECT_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let source = button.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            let data_url = source.get_attribute(ATTR_URL);
            match redirect_target(data_url.as_deref()) {
                Some(target) => navigate_to(target),
                None => warn!("profile update button has no data-url; staying on page"),
            }
        }));
        button
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to bind profile redirect".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}
