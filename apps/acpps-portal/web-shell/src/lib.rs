#![allow(clippy::needless_pass_by_value)]

#[cfg(any(target_arch = "wasm32", test))]
mod boot_plan;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use acpps_client_core::ControlKey;
    use acpps_client_core::acceptance::AcceptanceToggles;
    use acpps_client_core::capacity::CapacityEditors;
    use acpps_client_core::config::PageConfig;
    use acpps_client_core::csrf::CsrfToken;
    use acpps_client_core::task::TaskRegistry;
    use acpps_client_core::url_template::UrlTemplate;
    use serde::Serialize;
    use tracing::{debug, error, info, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlElement, HtmlInputElement};

    use crate::boot_plan::{PagePresence, ShellModule, boot_can_run, plan_modules};
    use crate::wasm_constants::*;

    mod dom;
    mod logging;
    mod navigation;
    mod network;
    mod supervisors;
    mod tasks;

    use dom::*;
    use network::*;

    thread_local! {
        static PAGE_CONFIG: RefCell<PageConfig> = RefCell::new(PageConfig::default());
        static CSRF_TOKEN: RefCell<Option<CsrfToken>> = const { RefCell::new(None) };
        static INSTALLED_MODULES: RefCell<Vec<ShellModule>> = const { RefCell::new(Vec::new()) };
        static ROW_ENDPOINTS: RefCell<Option<RowEndpoints>> = const { RefCell::new(None) };
        static ACCEPTANCE_TOGGLES: RefCell<AcceptanceToggles> = RefCell::new(AcceptanceToggles::default());
        static CAPACITY_EDITORS: RefCell<CapacityEditors> = RefCell::new(CapacityEditors::default());
        static TASK_REGISTRY: RefCell<TaskRegistry> = RefCell::new(TaskRegistry::default());
        static DOM_READY_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static PAGE_HIDE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static ACCEPTANCE_CLICK_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static CAPACITY_EVENT_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static CAPACITY_KEYDOWN_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::KeyboardEvent)>>> = const { RefCell::new(Vec::new()) };
        static TASK_CLICK_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
        static SEMESTER_FILTER_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static PROFILE_REDIRECT_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
    }

    /// URL templates read from the supervisor table body.
    #[derive(Debug, Clone)]
    struct RowEndpoints {
        toggle: Option<UrlTemplate>,
        capacity: Option<UrlTemplate>,
    }

    #[derive(Debug, Serialize)]
    struct ShellDiagnostics {
        modules: Vec<ShellModule>,
        csrf_token_present: bool,
        capacity_editors: usize,
        tasks: BTreeMap<String, &'static str>,
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        if let Err(error) = run_when_dom_ready(boot) {
            web_sys::console::error_1(&JsValue::from_str(&format!(
                "web shell failed to schedule boot: {error}"
            )));
        }
    }

    #[wasm_bindgen]
    pub fn shell_diagnostics_json() -> String {
        let diagnostics = ShellDiagnostics {
            modules: INSTALLED_MODULES.with(|modules| modules.borrow().clone()),
            csrf_token_present: CSRF_TOKEN.with(|slot| slot.borrow().is_some()),
            capacity_editors: CAPACITY_EDITORS.with(|editors| editors.borrow().len()),
            tasks: TASK_REGISTRY.with(|registry| {
                registry
                    .borrow()
                    .phases()
                    .map(|(key, phase)| (key.to_string(), phase.as_str()))
                    .collect()
            }),
        };
        serde_json::to_string(&diagnostics).unwrap_or_else(|_| "{}".to_string())
    }

    /// `<body>` is only guaranteed once the document has finished parsing,
    /// so page config and logging are set up here rather than in `start`.
    fn boot() {
        let config = PageConfig::from_attributes(body_attribute);
        logging::install(&config.log_level);
        PAGE_CONFIG.with(|slot| *slot.borrow_mut() = config);

        if let Err(error) = install_modules() {
            error!(%error, "web shell boot failed");
        }
    }

    fn install_modules() -> Result<(), String> {
        let token = cookie_header().and_then(|header| CsrfToken::from_cookie_header(&header));
        if token.is_none() {
            debug!("no csrftoken cookie; state-changing requests may be rejected");
        }
        CSRF_TOKEN.with(|slot| *slot.borrow_mut() = token);

        let document = document()?;
        let supervisor_table = document.get_element_by_id(SUPERVISOR_TABLE_BODY_ID);
        let semester_input = document.get_element_by_id(SEMESTER_INPUT_ID);
        let profile_button = document.get_element_by_id(PROFILE_UPDATE_BUTTON_ID);
        let presence = PagePresence {
            supervisor_table: supervisor_table.is_some(),
            task_buttons: tasks::present_task_kinds(&document).len(),
            semester_input: semester_input.is_some(),
            profile_update_button: profile_button.is_some(),
        };

        let modules = plan_modules(&presence);
        for module in &modules {
            let installed = match module {
                ShellModule::SupervisorTable => supervisor_table
                    .as_ref()
                    .map_or(Ok(()), supervisors::install),
                ShellModule::TaskLauncher => tasks::install(&document),
                ShellModule::SemesterFilter => semester_input
                    .as_ref()
                    .map_or(Ok(()), navigation::install_semester_filter),
                ShellModule::ProfileRedirect => profile_button
                    .as_ref()
                    .map_or(Ok(()), navigation::install_profile_redirect),
            };
            if let Err(error) = installed {
                warn!(?module, %error, "module install failed");
            }
        }

        info!(?modules, "web shell ready");
        INSTALLED_MODULES.with(|slot| *slot.borrow_mut() = modules);
        Ok(())
    }

    fn page_config() -> PageConfig {
        PAGE_CONFIG.with(|config| config.borrow().clone())
    }

    fn csrf_token() -> Option<CsrfToken> {
        CSRF_TOKEN.with(|slot| slot.borrow().clone())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::shell_diagnostics_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn shell_diagnostics_json() -> String {
    "{\"modules\":[],\"detail\":\"web shell diagnostics only available on wasm\"}".to_string()
}
