use std::cell::RefCell;
use std::rc::Rc;

use gloo_storage::Storage;
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

use hexfront_shared::Command;

use crate::api::{self, PollStatus};
use crate::canvas::BattleCanvas;

const SETTINGS_KEY: &str = "hexfront_settings";

const SPEED_MIN: &str = "0.25";
const SPEED_MAX: &str = "4";
const SPEED_STEP: &str = "0.25";
const SPEED_DEFAULT: f64 = 1.0;
/// Collapse a slider drag into a single control request.
const SPEED_DEBOUNCE_MS: u32 = 150;

/// Newtype wrappers so the loop-owned signals stay distinct in Leptos
/// context. The loop writes them; the control bar reads them.
#[derive(Clone, Copy)]
pub(crate) struct StatusLine(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct PollHealth(pub RwSignal<PollStatus>);

/// One entry per control affordance. The control bar is generated from this
/// list, so every command has exactly one source of truth in the UI.
struct ControlSpec {
    label: &'static str,
    primary: bool,
    key: &'static str,
    command: Command,
}

const CONTROLS: &[ControlSpec] = &[
    ControlSpec {
        label: "Pause",
        primary: false,
        key: "p",
        command: Command::Pause,
    },
    ControlSpec {
        label: "Resume",
        primary: true,
        key: "r",
        command: Command::Resume,
    },
];

const BTN_STYLE: &str = "background: #1a1d2a; border: 1px solid #282c3e; border-radius: 6px; cursor: pointer; color: #9a9590; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem; padding: 5px 14px; transition: border-color 0.15s, color 0.15s;";
const BTN_PRIMARY_STYLE: &str = "background: #1a1d2a; border: 1px solid rgba(245,197,66,0.4); border-radius: 6px; cursor: pointer; color: #f5c542; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem; padding: 5px 14px; transition: border-color 0.15s, color 0.15s;";

struct KeydownBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// UI settings persisted to localStorage across sessions.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    speed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SPEED_DEFAULT,
        }
    }
}

/// Root application component. The canvas loop publishes the status line and
/// poll health through context; everything else here is control wiring.
#[component]
pub fn App() -> impl IntoView {
    let status: RwSignal<String> = RwSignal::new("waiting for first snapshot".to_string());
    let health: RwSignal<PollStatus> = RwSignal::new(PollStatus::Connecting);
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();
    let speed: RwSignal<f64> = RwSignal::new(saved.speed);

    provide_context(StatusLine(status));
    provide_context(PollHealth(health));

    // Persist settings to localStorage on any change
    Effect::new(move || {
        let _ = gloo_storage::LocalStorage::set(
            SETTINGS_KEY,
            &Settings { speed: speed.get() },
        );
    });

    // Keyboard shortcuts for the same declarative control list the buttons
    // are built from.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                let target_tag = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                    .map(|el| el.tag_name())
                    .unwrap_or_default();

                // Don't intercept when typing in an input
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    return;
                }

                let key = e.key();
                if let Some(control) = CONTROLS.iter().find(|control| control.key == key) {
                    api::send_control(control.command, health);
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    // Debounce timer for the speed slider.
    // Hold the timeout handle so we can cancel without leaking JS callbacks.
    let debounce_timeout = Rc::new(RefCell::new(None::<Timeout>));

    let on_speed_input = {
        let debounce_timeout = Rc::clone(&debounce_timeout);
        move |e: web_sys::Event| {
            let Some(target) = e.target() else {
                return;
            };
            let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
                return;
            };
            let Ok(value) = input.value().parse::<f64>() else {
                return;
            };

            // Update the readout immediately for visual feedback
            speed.set(value);

            // Debounce the actual control request.
            if let Some(timeout) = debounce_timeout.borrow_mut().take() {
                timeout.cancel();
            }
            let timeout = Timeout::new(SPEED_DEBOUNCE_MS, move || {
                api::send_control(Command::Speed(value), health);
            });
            *debounce_timeout.borrow_mut() = Some(timeout);
        }
    };

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;">
            <BattleCanvas />
            <div style="position: absolute; top: 8px; left: 24px; right: 24px; z-index: 5; display: flex; align-items: center; gap: 10px; font-family: 'JetBrains Mono', monospace; font-size: 0.78rem; color: #e2e0d8;">
                {CONTROLS.iter().map(|control| {
                    let command = control.command;
                    let style = if control.primary { BTN_PRIMARY_STYLE } else { BTN_STYLE };
                    view! {
                        <button
                            style=style
                            title=format!("{} ({})", control.label, control.key)
                            on:click=move |_| api::send_control(command, health)
                        >
                            {control.label}
                        </button>
                    }
                }).collect::<Vec<_>>()}
                <input
                    type="range"
                    min=SPEED_MIN
                    max=SPEED_MAX
                    step=SPEED_STEP
                    value=move || speed.get().to_string()
                    on:input=on_speed_input
                    style="width: 140px; accent-color: #f5c542;"
                />
                <span style="color: #9a9590; min-width: 44px; font-variant-numeric: tabular-nums;">
                    {move || format!("{:.2}x", speed.get())}
                </span>
                <span style="margin-left: auto; color: #e2e0d8; font-variant-numeric: tabular-nums;">
                    {move || status.get()}
                </span>
                <span style=move || format!("color: {};", health_color(health.get()))>
                    {move || health.get().label()}
                </span>
            </div>
        </div>
    }
}

fn health_color(status: PollStatus) -> &'static str {
    match status {
        PollStatus::Connecting => "#9a9590",
        PollStatus::Live => "#5bd87a",
        PollStatus::Stalled => "#f5c542",
        PollStatus::Degraded => "#ff3366",
    }
}
