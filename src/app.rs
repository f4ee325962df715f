use std::path::PathBuf;

use egui::Pos2;

use crate::config::Settings;
use crate::engine::{ops, ClickModifiers, DragController, PointerPos, Selection};
use crate::model::{Lane, LaneId, Milestone, Project, Task, TaskColor, TaskId, TaskStore, TimelineViewport};
use crate::ui;
use crate::ui::timeline_chart::ChartAction;

/// Main application state.
///
/// Sole owner of the task collection. Every edit computes a new collection from
/// the current snapshot and swaps it in whole.
pub struct TimelineApp {
    pub project: Project,
    pub viewport: TimelineViewport,
    pub selection: Selection,
    pub drag: DragController,

    // Rename mode
    pub editing: Option<TaskId>,
    pub rename_buffer: String,

    pub settings: Settings,
    settings_path: Option<PathBuf>,

    pub show_about: bool,
    pub status_message: String,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        Self::with_project(Self::sample_project(), settings, settings_path)
    }

    fn with_project(project: Project, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        Self {
            project,
            viewport: settings.viewport(),
            selection: Selection::default(),
            drag: DragController::default(),
            editing: None,
            rename_buffer: String::new(),
            settings,
            settings_path,
            show_about: false,
            status_message: "Ready".to_string(),
        }
    }

    /// Generate a sample timeline for demonstration.
    fn sample_project() -> Project {
        let mut project = Project::new("Sample Timeline");

        let design = Lane::new("Design");
        let development = Lane::new("Development");
        let testing = Lane::new("Testing");

        let research = Task::new("Research", design.id, 0, 5);
        let mut wireframes = Task::new("Wireframes", design.id, 5, 7);
        wireframes.dependencies.push(research.id);
        let mut ui_design = Task::new("UI Design", design.id, 12, 10);
        ui_design.dependencies.push(wireframes.id);

        let mut frontend = Task::new("Frontend Setup", development.id, 8, 6).with_color(TaskColor::Green);
        frontend.dependencies.push(wireframes.id);
        let mut backend = Task::new("Backend API", development.id, 14, 12).with_color(TaskColor::Green);
        backend.dependencies.push(frontend.id);
        let mut integration = Task::new("Integration", development.id, 26, 8).with_color(TaskColor::Green);
        integration.dependencies = vec![backend.id, ui_design.id];

        let unit_tests = Task::new("Unit Tests", testing.id, 20, 10).with_color(TaskColor::Purple);
        let mut qa = Task::new("QA Testing", testing.id, 34, 8).with_color(TaskColor::Purple);
        qa.dependencies = vec![integration.id, unit_tests.id];

        project.lanes = vec![design, development, testing];
        project.store = TaskStore::new(vec![
            research,
            wireframes,
            ui_design,
            frontend,
            backend,
            integration,
            unit_tests,
            qa,
        ]);
        project.milestones = vec![
            Milestone::new("Design Complete", 22),
            Milestone::new("MVP Release", 42),
        ];
        project
    }

    fn tasks(&self) -> &[Task] {
        self.project.store.tasks()
    }

    fn commit(&mut self, tasks: Vec<Task>) {
        self.project.store.replace(tasks);
    }

    // --- Selection ---

    pub fn click_task(&mut self, id: TaskId, modifiers: ClickModifiers) {
        if self.editing.is_some() {
            return;
        }
        let tasks = self.project.store.tasks();
        self.selection.click(id, modifiers, tasks);
    }

    pub fn select_all(&mut self) {
        let tasks = self.project.store.tasks();
        self.selection.select_all(tasks);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Drag ---

    pub fn begin_drag(&mut self, id: TaskId, pointer: Pos2) {
        let started = self.drag.begin(
            id,
            PointerPos::new(pointer.x, pointer.y),
            self.selection.ids(),
            self.editing,
            self.project.store.tasks(),
        );
        if let (true, Some(session)) = (started, self.drag.session()) {
            self.status_message = format!("Moving {} task(s)...", session.task_ids().len());
        }
    }

    pub fn drag_to(&mut self, pointer: Pos2) {
        let geometry = self.viewport.geometry();
        if let Some(tasks) = self.drag.update(
            PointerPos::new(pointer.x, pointer.y),
            geometry,
            self.project.store.tasks(),
        ) {
            self.project.store.replace(tasks);
        }
    }

    pub fn end_drag(&mut self) {
        let Some(result) = self.drag.end(self.project.store.tasks()) else {
            return;
        };
        match result {
            Ok(tasks) => {
                if let Some(last) = tasks.iter().map(|t| t.end_day()).max() {
                    self.viewport.ensure_visible(last);
                }
                self.commit(tasks);
                self.status_message = "Timeline updated".to_string();
            }
            Err(e) => {
                tracing::error!("drag commit rejected: {e}");
                self.status_message = "Move could not be applied".to_string();
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        if let Some(tasks) = self.drag.cancel(self.project.store.tasks()) {
            self.project.store.replace(tasks);
            self.status_message = "Move cancelled".to_string();
        }
    }

    // --- Task operations ---

    pub fn start_rename(&mut self, id: TaskId) {
        if let Some(task) = self.project.store.get(id) {
            self.rename_buffer = task.title.clone();
            self.editing = Some(id);
        }
    }

    pub fn finish_rename(&mut self) {
        let Some(id) = self.editing.take() else {
            return;
        };
        let title = std::mem::take(&mut self.rename_buffer);
        match ops::rename_task(self.tasks(), id, title.trim()) {
            Ok(tasks) => {
                self.commit(tasks);
                self.status_message = format!("Renamed to '{}'", title.trim());
            }
            Err(e) => tracing::debug!("rename skipped: {e}"),
        }
    }

    pub fn cancel_rename(&mut self) {
        self.editing = None;
        self.rename_buffer.clear();
    }

    pub fn delete_tasks(&mut self, target: TaskId) {
        let ids = ops::action_targets(target, self.selection.ids());
        self.delete_ids(&ids);
    }

    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let ids = self.selection.ids().to_vec();
        self.delete_ids(&ids);
    }

    fn delete_ids(&mut self, ids: &[TaskId]) {
        let tasks = ops::delete_tasks(self.tasks(), ids);
        self.commit(tasks);
        self.selection.retain_existing(self.project.store.tasks());
        if self.editing.is_some_and(|id| ids.contains(&id)) {
            self.cancel_rename();
        }
        self.status_message = format!("Deleted {} task(s)", ids.len());
    }

    pub fn copy_tasks(&mut self, target: TaskId) {
        let ids = ops::action_targets(target, self.selection.ids());
        let (tasks, created) = ops::copy_tasks(self.tasks(), &ids);
        self.commit(tasks);
        self.status_message = format!("Copied {} task(s)", created.len());
    }

    pub fn recolor_tasks(&mut self, target: TaskId, color: TaskColor) {
        let ids = ops::action_targets(target, self.selection.ids());
        let tasks = ops::recolor_tasks(self.tasks(), &ids, color);
        self.commit(tasks);
    }

    pub fn add_task(&mut self, lane_id: LaneId) {
        let (tasks, id) = ops::add_task(self.tasks(), lane_id);
        self.commit(tasks);
        self.selection.select_only(id);
        self.status_message = "Task added".to_string();
    }

    pub fn add_lane(&mut self) {
        self.project.lanes = ops::add_lane(&self.project.lanes);
        self.status_message = "Lane added".to_string();
    }

    pub fn toggle_lane(&mut self, lane_id: LaneId) {
        match ops::toggle_lane(&self.project.lanes, lane_id) {
            Ok(lanes) => self.project.lanes = lanes,
            Err(e) => tracing::debug!("toggle skipped: {e}"),
        }
    }

    pub fn add_milestone(&mut self) {
        self.project.milestones = ops::add_milestone(&self.project.milestones);
        self.status_message = "Milestone added".to_string();
    }

    pub fn remove_dependency(&mut self, task: TaskId, dependency: TaskId) {
        let tasks = ops::remove_dependency(self.tasks(), task, dependency);
        self.commit(tasks);
        self.status_message = "Dependency removed".to_string();
    }

    pub fn add_dependency(&mut self, task: TaskId, dependency: TaskId) {
        let tasks = ops::add_dependency(self.tasks(), task, dependency);
        self.commit(tasks);
    }

    // --- View ---

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.save_settings();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.save_settings();
    }

    fn save_settings(&mut self) {
        self.settings.pixels_per_day = self.viewport.pixels_per_day;
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save(path) {
            tracing::warn!("{e}");
        }
    }

    fn apply(&mut self, action: ChartAction) {
        match action {
            ChartAction::Click { task, modifiers } => self.click_task(task, modifiers),
            ChartAction::DragStart { task, pointer } => {
                if !self.selection.contains(task) && self.editing.is_none() {
                    self.selection.select_only(task);
                }
                self.begin_drag(task, pointer);
            }
            ChartAction::ContextOpened(task) => {
                if !self.selection.contains(task) {
                    self.selection.select_only(task);
                }
            }
            ChartAction::Rename(task) => self.start_rename(task),
            ChartAction::RenameDone => self.finish_rename(),
            ChartAction::RenameCancelled => self.cancel_rename(),
            ChartAction::Copy(task) => self.copy_tasks(task),
            ChartAction::Delete(task) => self.delete_tasks(task),
            ChartAction::Recolor(task, color) => self.recolor_tasks(task, color),
            ChartAction::LinkTo { task, dependency } => self.add_dependency(task, dependency),
            ChartAction::Unlink { task, dependency } => self.remove_dependency(task, dependency),
            ChartAction::ToggleLane(lane) => self.toggle_lane(lane),
            ChartAction::AddTask(lane) => self.add_task(lane),
            ChartAction::ClearSelection => self.clear_selection(),
        }
    }

    /// Drive the live session from raw pointer state. Releasing the button
    /// commits; losing the button any other way (focus loss, capture lost) or
    /// pressing Escape cancels.
    fn pump_drag(&mut self, ctx: &egui::Context) {
        if !self.drag.is_active() {
            return;
        }
        let (pos, down, released, focused, escape) = ctx.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.focused,
                i.key_pressed(egui::Key::Escape),
            )
        });

        if escape || !focused {
            self.cancel_drag();
            return;
        }
        if let Some(pos) = pos {
            if down || released {
                self.drag_to(pos);
            }
        }
        if released {
            self.end_drag();
        } else if !down {
            self.cancel_drag();
        }
        ctx.request_repaint();
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.editing.is_some() || self.drag.is_active() || ctx.wants_keyboard_input() {
            return;
        }
        let (select_all, delete, escape) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::A),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if select_all {
            self.select_all();
        } else if delete {
            self.delete_selected();
        } else if escape {
            self.clear_selection();
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        self.handle_shortcuts(ctx);

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS_BAR)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Selected: {} · Zoom: {:.0}%",
                                self.project.store.len(),
                                self.selection.len(),
                                self.viewport.pixels_per_day / Settings::default().pixels_per_day * 100.0
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: timeline chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let mut actions = Vec::new();
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            actions = ui::timeline_chart::show_timeline_chart(
                &self.project,
                &mut self.viewport,
                &self.selection,
                self.drag.session(),
                self.editing,
                &mut self.rename_buffer,
                ui,
            );
        });
        for action in actions {
            self.apply(action);
        }

        self.pump_drag(ctx);

        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
