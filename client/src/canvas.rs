use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::api::{self, FetchError, PollStatus};
use crate::app::{PollHealth, StatusLine};
use crate::colors;
use crate::layout::HexLayout;
use crate::render_loop::{FpsCounter, FrameLoop};
use crate::scene::{self, DrawOp, FramePlan, Viewport};
use crate::status::format_status;

const HEX_OUTLINE_WIDTH: f64 = 0.75;
const HEX_OUTLINE_DASH: f64 = 2.0;

thread_local! {
    // The loop runs for the lifetime of the page. Parking it here follows
    // the same pattern as the keydown binding: a remount replaces the old
    // loop, and dropping it cancels its pending animation frame.
    static FRAME_LOOP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
}

/// The battle map canvas plus the loop that feeds it.
///
/// Each animation frame: count the frame, poll `/api/state` (the loop's only
/// suspension point), plan and paint the snapshot, publish the status line.
/// A failed poll or an unrenderable snapshot skips the redraw, leaving the
/// last good frame on screen, and the loop keeps going.
#[component]
pub fn BattleCanvas() -> impl IntoView {
    let StatusLine(status) = expect_context();
    let PollHealth(health) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Cached Canvas 2D context; obtained once, reused every frame.
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
    let fps: Rc<RefCell<Option<FpsCounter>>> = Rc::new(RefCell::new(None));
    let last_fps: Rc<Cell<u32>> = Rc::new(Cell::new(0));

    let frame_loop = FrameLoop::start(move |now_ms| {
        let cached_ctx = cached_ctx.clone();
        let fps = fps.clone();
        let last_fps = last_fps.clone();
        async move {
            if let Some(rate) = fps
                .borrow_mut()
                .get_or_insert_with(|| FpsCounter::new(now_ms))
                .frame(now_ms)
            {
                last_fps.set(rate);
            }

            let snapshot = match api::fetch_state().await {
                Ok(snapshot) => {
                    let previous = health.get_untracked();
                    if previous != PollStatus::Live {
                        if previous != PollStatus::Connecting {
                            web_sys::console::info_1(&"state poll recovered".into());
                        }
                        health.set(PollStatus::Live);
                    }
                    snapshot
                }
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("state poll failed, keeping last frame: {e}").into(),
                    );
                    health.set(match e {
                        FetchError::Transport(_) => PollStatus::Stalled,
                        FetchError::Decode(_) => PollStatus::Degraded,
                    });
                    return;
                }
            };

            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let canvas: &HtmlCanvasElement = &canvas;
            let Some((width, height)) = sync_backing_store(canvas) else {
                return;
            };

            let plan = match scene::build(&snapshot, Viewport { width, height }) {
                Ok(plan) => plan,
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("unrenderable snapshot, keeping last frame: {e}").into(),
                    );
                    health.set(PollStatus::Degraded);
                    return;
                }
            };

            let Some(ctx) = context_2d(canvas, &cached_ctx) else {
                return;
            };
            paint(&ctx, &plan);

            status.set(format_status(
                snapshot.tick,
                snapshot.bases[0].hp,
                snapshot.bases[1].hp,
                last_fps.get(),
            ));
        }
    });
    FRAME_LOOP.with(move |slot| {
        *slot.borrow_mut() = Some(frame_loop);
    });

    view! {
        <canvas
            node_ref=canvas_ref
            style=format!(
                "position: absolute; inset: 0; width: 100%; height: 100%; display: block; background: {};",
                colors::BACKGROUND
            )
        />
    }
}

/// Resync the backing store to the displayed (layout) size. Runs before
/// every paint, which covers both the initial draw and window resizes, so
/// the coordinate math never operates on stale dimensions. Returns the
/// frame's pixel space, or `None` while the canvas is collapsed to zero.
fn sync_backing_store(canvas: &HtmlCanvasElement) -> Option<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    let width = rect.width().round() as u32;
    let height = rect.height().round() as u32;
    if width == 0 || height == 0 {
        return None;
    }
    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }
    Some((width as f64, height as f64))
}

fn context_2d(
    canvas: &HtmlCanvasElement,
    cache: &Rc<RefCell<Option<CanvasRenderingContext2d>>>,
) -> Option<CanvasRenderingContext2d> {
    let mut ctx_cache = cache.borrow_mut();
    if ctx_cache.is_none() {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())?;
        *ctx_cache = Some(ctx);
    }
    ctx_cache.clone()
}

/// Execute a frame plan in order. The plan's order is the occlusion
/// contract; nothing here reorders or batches across ops.
fn paint(ctx: &CanvasRenderingContext2d, plan: &FramePlan) {
    let dash = js_sys::Array::of2(
        &JsValue::from_f64(HEX_OUTLINE_DASH),
        &JsValue::from_f64(HEX_OUTLINE_DASH),
    );
    for op in &plan.ops {
        match op {
            DrawOp::Clear { width, height } => {
                ctx.clear_rect(0.0, 0.0, *width, *height);
            }
            DrawOp::TerrainHex { cx, cy, fill } => {
                trace_hex(ctx, &plan.layout, *cx, *cy);
                ctx.set_fill_style_str(fill);
                ctx.fill();
                ctx.save();
                ctx.set_stroke_style_str(colors::HEX_OUTLINE);
                ctx.set_line_width(HEX_OUTLINE_WIDTH);
                ctx.set_line_dash(&dash).ok();
                ctx.stroke();
                ctx.restore();
            }
            DrawOp::BaseDisc {
                cx,
                cy,
                radius,
                fill,
            }
            | DrawOp::UnitDisc {
                cx,
                cy,
                radius,
                fill,
            } => {
                ctx.set_fill_style_str(fill);
                ctx.begin_path();
                ctx.arc(*cx, *cy, *radius, 0.0, std::f64::consts::TAU).ok();
                ctx.fill();
            }
        }
    }
}

fn trace_hex(ctx: &CanvasRenderingContext2d, layout: &HexLayout, cx: f64, cy: f64) {
    ctx.begin_path();
    for (i, (px, py)) in layout.corners(cx, cy).into_iter().enumerate() {
        if i == 0 {
            ctx.move_to(px, py);
        } else {
            ctx.line_to(px, py);
        }
    }
    ctx.close_path();
}
