use std::collections::HashMap;

use chrono::{Datelike, Duration};
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use egui_phosphor::regular as icons;

use crate::engine::{ClickModifiers, DragSession, Selection};
use crate::model::{LaneId, Project, Task, TaskColor, TaskId, TimelineViewport};
use crate::ui::theme;

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const LANE_HEADER_HEIGHT: f32 = theme::LANE_HEADER_HEIGHT;
const GUTTER: f32 = theme::LANE_LABEL_WIDTH;

/// Something the user did in the chart. The app applies these after the
/// frame so the chart only ever reads the project.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartAction {
    Click { task: TaskId, modifiers: ClickModifiers },
    DragStart { task: TaskId, pointer: Pos2 },
    ContextOpened(TaskId),
    Rename(TaskId),
    RenameDone,
    RenameCancelled,
    Copy(TaskId),
    Delete(TaskId),
    Recolor(TaskId, TaskColor),
    LinkTo { task: TaskId, dependency: TaskId },
    Unlink { task: TaskId, dependency: TaskId },
    ToggleLane(LaneId),
    AddTask(LaneId),
    ClearSelection,
}

/// Vertical placement of one lane, relative to the top of the lane area.
#[derive(Debug, Clone, PartialEq)]
struct LaneRow {
    lane_id: LaneId,
    top: f32,
    /// Zero when the lane is collapsed.
    slots: u32,
}

impl LaneRow {
    fn body_top(&self) -> f32 {
        self.top + LANE_HEADER_HEIGHT
    }

    fn bottom(&self, slot_height: f32) -> f32 {
        self.body_top() + self.slots as f32 * slot_height
    }
}

fn lane_rows(project: &Project, slot_height: f32) -> Vec<LaneRow> {
    let mut top = 0.0;
    project
        .lanes
        .iter()
        .map(|lane| {
            let slots = if lane.is_expanded {
                project.store.slot_count(lane.id)
            } else {
                0
            };
            let row = LaneRow {
                lane_id: lane.id,
                top,
                slots,
            };
            top = row.bottom(slot_height);
            row
        })
        .collect()
}

/// Render the timeline (header, swim lanes, bars, milestones and arrows).
pub fn show_timeline_chart(
    project: &Project,
    viewport: &mut TimelineViewport,
    selection: &Selection,
    session: Option<&DragSession>,
    editing: Option<TaskId>,
    rename_buffer: &mut String,
    ui: &mut Ui,
) -> Vec<ChartAction> {
    let mut actions = Vec::new();
    let available = ui.available_size();

    // Ctrl+scroll zooms; the setting is only written from the View menu.
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.command) {
        if scroll_delta.y > 0.0 {
            viewport.zoom_in();
        } else if scroll_delta.y < 0.0 {
            viewport.zoom_out();
        }
    }

    let rows = lane_rows(project, viewport.slot_height);
    let lanes_height = rows
        .last()
        .map(|r| r.bottom(viewport.slot_height))
        .unwrap_or(0.0);
    let chart_width = GUTTER + viewport.total_width();
    let chart_height = HEADER_HEIGHT + lanes_height + 40.0;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width.max(available.x), chart_height.max(available.y)),
                Sense::click(),
            );
            let canvas = response.rect;
            let origin = canvas.min;
            let day_origin = origin.x + GUTTER;
            let lanes_top = origin.y + HEADER_HEIGHT;
            let mut consumed_click = false;

            painter.rect_filled(canvas, 0.0, theme::BG_DARK);

            draw_timeline_header(&painter, project, viewport, origin, canvas);

            // Lane backgrounds, slot separators and gutter labels
            for row in &rows {
                let Some(lane) = project.lane(row.lane_id) else {
                    continue;
                };
                let header = Rect::from_min_size(
                    Pos2::new(origin.x, lanes_top + row.top),
                    Vec2::new(canvas.width(), LANE_HEADER_HEIGHT),
                );
                painter.rect_filled(header, 0.0, theme::BG_LANE_HEADER);
                painter.line_segment(
                    [header.left_bottom(), header.right_bottom()],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );

                let caret = if lane.is_expanded {
                    icons::CARET_DOWN
                } else {
                    icons::CARET_RIGHT
                };
                let toggle_rect = Rect::from_min_size(
                    header.min + Vec2::new(4.0, 3.0),
                    Vec2::splat(LANE_HEADER_HEIGHT - 6.0),
                );
                if ui.put(toggle_rect, egui::Button::new(caret).frame(false)).clicked() {
                    actions.push(ChartAction::ToggleLane(lane.id));
                    consumed_click = true;
                }

                let title = painter.layout_no_wrap(lane.title.clone(), theme::font_header(), theme::TEXT_PRIMARY);
                let title_clip = Rect::from_min_max(
                    Pos2::new(toggle_rect.right() + 4.0, header.top()),
                    Pos2::new(origin.x + GUTTER - LANE_HEADER_HEIGHT, header.bottom()),
                );
                painter.with_clip_rect(title_clip).galley(
                    Pos2::new(title_clip.left(), header.center().y - title.size().y / 2.0),
                    title,
                    Color32::TRANSPARENT,
                );

                let add_rect = Rect::from_min_size(
                    Pos2::new(origin.x + GUTTER - LANE_HEADER_HEIGHT + 3.0, header.top() + 3.0),
                    Vec2::splat(LANE_HEADER_HEIGHT - 6.0),
                );
                if ui
                    .put(add_rect, egui::Button::new(icons::PLUS).frame(false))
                    .on_hover_text("Add task")
                    .clicked()
                {
                    actions.push(ChartAction::AddTask(lane.id));
                    consumed_click = true;
                }

                for slot in 0..row.slots {
                    let y = lanes_top + row.body_top() + slot as f32 * viewport.slot_height;
                    let slot_rect = Rect::from_min_size(
                        Pos2::new(origin.x, y),
                        Vec2::new(canvas.width(), viewport.slot_height),
                    );
                    let bg = if slot % 2 == 0 {
                        theme::BG_PANEL
                    } else {
                        theme::BG_DARK
                    };
                    painter.rect_filled(slot_rect, 0.0, bg);
                    painter.line_segment(
                        [slot_rect.left_bottom(), slot_rect.right_bottom()],
                        Stroke::new(0.5, theme::SLOT_LINE),
                    );
                }
            }

            // Gutter separator
            painter.line_segment(
                [
                    Pos2::new(day_origin, lanes_top),
                    Pos2::new(day_origin, canvas.bottom()),
                ],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );

            draw_day_grid(&painter, viewport, day_origin, lanes_top, canvas.bottom());

            // Bars
            let row_by_lane: HashMap<LaneId, &LaneRow> = rows.iter().map(|r| (r.lane_id, r)).collect();
            let mut bar_rects: HashMap<TaskId, Rect> = HashMap::new();
            let bar_area = painter.with_clip_rect(Rect::from_min_max(
                Pos2::new(day_origin, lanes_top),
                canvas.max,
            ));
            for task in project.store.tasks() {
                let Some(row) = row_by_lane.get(&task.lane_id) else {
                    continue;
                };
                if row.slots == 0 {
                    continue;
                }
                let y = lanes_top + row.body_top() + task.slot as f32 * viewport.slot_height;
                if let Some(snapped) = session.and_then(|s| s.snapped_slots(task.id)) {
                    let trail = snapped
                        .iter()
                        .filter(|&&slot| slot != task.slot && slot < row.slots)
                        .map(|&slot| lanes_top + row.body_top() + slot as f32 * viewport.slot_height);
                    draw_snap_trail(&bar_area, viewport, day_origin, task, trail);
                }
                let style = BarStyle {
                    selected: selection.contains(task.id),
                    moving: session.is_some_and(|s| s.is_dragging(task.id)),
                    contested: session.is_some_and(|s| s.is_contested(task.id)),
                };
                let bar_rect = draw_task_bar(&bar_area, viewport, day_origin, task, y, style);
                bar_rects.insert(task.id, bar_rect);
            }

            draw_dependency_arrows(&bar_area, project, &bar_rects);

            if project.store.is_empty() && !rows.is_empty() {
                painter.text(
                    Pos2::new(day_origin + 12.0, lanes_top + LANE_HEADER_HEIGHT + viewport.slot_height / 2.0),
                    egui::Align2::LEFT_CENTER,
                    format!("No tasks yet. Use {} on a lane to add one.", icons::PLUS),
                    theme::font_sub(),
                    theme::TEXT_DIM,
                );
            }

            draw_milestones(&painter, project, viewport, day_origin, origin.y, canvas.bottom());

            // Interaction pass over the bars
            for task in project.store.tasks() {
                let Some(&bar_rect) = bar_rects.get(&task.id) else {
                    continue;
                };

                if editing == Some(task.id) {
                    let edit = ui.put(
                        bar_rect.shrink2(Vec2::new(2.0, 2.0)),
                        egui::TextEdit::singleline(&mut *rename_buffer).font(theme::font_bar()),
                    );
                    if edit.lost_focus() {
                        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                            actions.push(ChartAction::RenameCancelled);
                        } else {
                            actions.push(ChartAction::RenameDone);
                        }
                    } else if !edit.has_focus() {
                        edit.request_focus();
                    }
                    continue;
                }

                let bar_response = ui.interact(
                    bar_rect,
                    ui.make_persistent_id(("task-bar", task.id)),
                    Sense::click_and_drag(),
                );

                if bar_response.clicked() {
                    let modifiers = ui.input(|i| ClickModifiers {
                        command: i.modifiers.command,
                        shift: i.modifiers.shift,
                    });
                    actions.push(ChartAction::Click {
                        task: task.id,
                        modifiers,
                    });
                    consumed_click = true;
                }

                if bar_response.double_clicked() {
                    actions.push(ChartAction::Rename(task.id));
                }

                if bar_response.drag_started() && session.is_none() {
                    // Measure from the press, not from where the drag threshold was crossed.
                    let pointer = ui
                        .input(|i| i.pointer.press_origin())
                        .or_else(|| bar_response.interact_pointer_pos());
                    if let Some(pointer) = pointer {
                        actions.push(ChartAction::DragStart {
                            task: task.id,
                            pointer,
                        });
                    }
                    consumed_click = true;
                }

                if bar_response.dragged() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                } else if bar_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                }

                if bar_response.secondary_clicked() {
                    actions.push(ChartAction::ContextOpened(task.id));
                }

                if bar_response.hovered() && session.is_none() {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("task-tip", task.id)),
                        |ui| {
                            ui.strong(&task.title);
                            let start = project.origin + Duration::days(task.start_day as i64);
                            let end = project.origin + Duration::days(task.end_day() as i64 - 1);
                            ui.label(format!("{} → {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y")));
                            ui.label(format!("Day {} · {} day(s)", task.start_day, task.duration));
                        },
                    );
                }

                let targets = if selection.contains(task.id) {
                    selection.len()
                } else {
                    1
                };
                bar_response.context_menu(|ui| {
                    task_context_menu(ui, project, task, targets, &mut actions);
                });
            }

            // Empty click on background clears selection
            if response.clicked() && !consumed_click {
                actions.push(ChartAction::ClearSelection);
            }
        });

    actions
}

fn task_context_menu(
    ui: &mut Ui,
    project: &Project,
    task: &Task,
    targets: usize,
    actions: &mut Vec<ChartAction>,
) {
    if ui.button(format!("{} Rename", icons::PENCIL_SIMPLE)).clicked() {
        actions.push(ChartAction::Rename(task.id));
        ui.close_menu();
    }
    if ui.button(format!("{} Copy ({targets})", icons::COPY)).clicked() {
        actions.push(ChartAction::Copy(task.id));
        ui.close_menu();
    }
    ui.menu_button(format!("{} Color", icons::PALETTE), |ui| {
        for color in TaskColor::ALL {
            let swatch = egui::RichText::new(format!("■ {}", color.label())).color(theme::task_color(color));
            if ui.button(swatch).clicked() {
                actions.push(ChartAction::Recolor(task.id, color));
                ui.close_menu();
            }
        }
    });
    ui.menu_button(format!("{} Depends on", icons::LINK), |ui| {
        let candidates = project
            .store
            .tasks()
            .iter()
            .filter(|t| t.id != task.id && !task.depends_on(t.id));
        for other in candidates {
            if ui.button(&other.title).clicked() {
                actions.push(ChartAction::LinkTo {
                    task: task.id,
                    dependency: other.id,
                });
                ui.close_menu();
            }
        }
    });
    if !task.dependencies.is_empty() {
        ui.menu_button(format!("{} Remove dependency", icons::LINK_BREAK), |ui| {
            for dep in &task.dependencies {
                let Some(other) = project.store.get(*dep) else {
                    continue;
                };
                if ui.button(&other.title).clicked() {
                    actions.push(ChartAction::Unlink {
                        task: task.id,
                        dependency: *dep,
                    });
                    ui.close_menu();
                }
            }
        });
    }
    ui.separator();
    let delete = egui::RichText::new(format!("{} Delete ({targets})", icons::TRASH)).color(theme::OVERLAP_WARNING);
    if ui.button(delete).clicked() {
        actions.push(ChartAction::Delete(task.id));
        ui.close_menu();
    }
}

fn draw_timeline_header(
    painter: &egui::Painter,
    project: &Project,
    viewport: &TimelineViewport,
    origin: Pos2,
    canvas: Rect,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(canvas.width(), HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(canvas.right(), origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    painter.text(
        Pos2::new(origin.x + 10.0, origin.y + HEADER_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        &project.name,
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );

    let day_origin = origin.x + GUTTER;
    let header = painter.with_clip_rect(Rect::from_min_max(
        Pos2::new(day_origin, origin.y),
        Pos2::new(canvas.right(), origin.y + HEADER_HEIGHT),
    ));
    for day in 0..viewport.total_days {
        let date = project.origin + Duration::days(day as i64);
        let x = day_origin + viewport.day_to_x(day);

        if day == 0 || date.weekday().num_days_from_monday() == 0 {
            header.text(
                Pos2::new(x + 3.0, origin.y + 12.0),
                egui::Align2::LEFT_CENTER,
                date.format("%d %b").to_string(),
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }

        if viewport.pixels_per_day >= 16.0 {
            let is_weekend = date.weekday().num_days_from_monday() >= 5;
            let color = if is_weekend {
                theme::TEXT_DIM
            } else {
                theme::TEXT_SECONDARY
            };
            header.text(
                Pos2::new(x + 3.0, origin.y + 30.0),
                egui::Align2::LEFT_CENTER,
                day.to_string(),
                theme::font_sub(),
                color,
            );
        }
    }
}

fn draw_day_grid(painter: &egui::Painter, viewport: &TimelineViewport, day_origin: f32, top: f32, bottom: f32) {
    // Thin out gridlines when zoomed far out
    let step = if viewport.pixels_per_day >= 8.0 { 1 } else { 7 };
    for day in (0..=viewport.total_days).step_by(step) {
        let x = day_origin + viewport.day_to_x(day);
        painter.line_segment(
            [Pos2::new(x, top), Pos2::new(x, bottom)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BarStyle {
    selected: bool,
    moving: bool,
    contested: bool,
}

fn draw_task_bar(
    painter: &egui::Painter,
    viewport: &TimelineViewport,
    day_origin: f32,
    task: &Task,
    y: f32,
    style: BarStyle,
) -> Rect {
    let x_start = day_origin + viewport.day_to_x(task.start_day);
    let bar_width = (viewport.pixels_per_day * task.duration as f32).max(6.0);
    let inset = theme::BAR_INSET;

    let bar_rect = Rect::from_min_size(
        Pos2::new(x_start, y + inset),
        Vec2::new(bar_width, viewport.slot_height - inset * 2.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let mut fill = theme::task_color(task.color);
    if style.moving {
        fill = fill.gamma_multiply(0.8);
    }

    // Soft shadow, lifted further while moving
    let lift = if style.moving { 4.0 } else { 2.0 };
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, lift)),
        rounding,
        Color32::from_black_alpha(35),
    );

    painter.rect_filled(bar_rect, rounding, fill);
    let highlight_rect = Rect::from_min_size(
        bar_rect.min,
        Vec2::new(bar_width, (bar_rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight_rect,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if style.contested {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::OVERLAP_WARNING),
        );
    } else if style.selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar_width > 30.0 {
        let galley = painter.layout_no_wrap(task.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        painter.with_clip_rect(bar_rect.intersect(painter.clip_rect())).galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}

/// Faint outlines in every row a dragged task was bumped into during the
/// current drag, at the task's current day range.
fn draw_snap_trail(
    painter: &egui::Painter,
    viewport: &TimelineViewport,
    day_origin: f32,
    task: &Task,
    rows_y: impl Iterator<Item = f32>,
) {
    let x = day_origin + viewport.day_to_x(task.start_day);
    let width = (viewport.pixels_per_day * task.duration as f32).max(6.0);
    let inset = theme::BAR_INSET;
    for y in rows_y {
        let rect = Rect::from_min_size(
            Pos2::new(x, y + inset),
            Vec2::new(width, viewport.slot_height - inset * 2.0),
        );
        painter.rect_stroke(
            rect,
            Rounding::same(theme::BAR_ROUNDING),
            Stroke::new(1.0, theme::OVERLAP_WARNING.gamma_multiply(0.45)),
        );
    }
}

/// Elbow arrows from the end of each dependency to the start of its dependent.
/// Tasks in collapsed lanes have no rect and are skipped.
fn draw_dependency_arrows(painter: &egui::Painter, project: &Project, bar_rects: &HashMap<TaskId, Rect>) {
    let stroke = Stroke::new(1.5, theme::DEP_ARROW);
    for task in project.store.tasks() {
        let Some(to) = bar_rects.get(&task.id) else {
            continue;
        };
        for dep in &task.dependencies {
            let Some(from) = bar_rects.get(dep) else {
                continue;
            };
            let start = from.right_center();
            let end = to.left_center();
            let elbow_x = start.x + 8.0;
            let points = vec![
                start,
                Pos2::new(elbow_x, start.y),
                Pos2::new(elbow_x, end.y),
                Pos2::new(end.x - 5.0, end.y),
            ];
            painter.add(egui::Shape::line(points, stroke));
            painter.add(egui::Shape::convex_polygon(
                vec![
                    end,
                    Pos2::new(end.x - 6.0, end.y - 4.0),
                    Pos2::new(end.x - 6.0, end.y + 4.0),
                ],
                theme::DEP_ARROW,
                Stroke::NONE,
            ));
        }
    }
}

fn draw_milestones(
    painter: &egui::Painter,
    project: &Project,
    viewport: &TimelineViewport,
    day_origin: f32,
    top: f32,
    bottom: f32,
) {
    for milestone in &project.milestones {
        let x = day_origin + viewport.day_to_x(milestone.day);
        painter.line_segment(
            [Pos2::new(x, top + HEADER_HEIGHT), Pos2::new(x, bottom)],
            Stroke::new(1.5, theme::MILESTONE.gamma_multiply(0.6)),
        );

        let center = Pos2::new(x, top + HEADER_HEIGHT);
        let size = 6.0;
        painter.add(egui::Shape::convex_polygon(
            vec![
                Pos2::new(center.x, center.y - size),
                Pos2::new(center.x + size, center.y),
                Pos2::new(center.x, center.y + size),
                Pos2::new(center.x - size, center.y),
            ],
            theme::MILESTONE,
            Stroke::NONE,
        ));
        painter.text(
            Pos2::new(x + size + 4.0, top + HEADER_HEIGHT + 10.0),
            egui::Align2::LEFT_CENTER,
            &milestone.title,
            theme::font_small(),
            theme::MILESTONE,
        );
    }
}
