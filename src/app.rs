use egui::color_picker::{color_edit_button_srgba, Alpha};
use egui::{
    Color32, ColorImage, Key, KeyboardShortcut, Modifiers, Painter, Pos2, Rect, Sense, Stroke,
    TextureHandle, TextureOptions, Vec2, ViewportCommand,
};

use crate::command::Command;
use crate::dialogs::{self, NativeDialogs};
use crate::document::{CanvasMeta, Document, MAX_CANVAS_SIDE};
use crate::editor::Editor;
use crate::error::EditorError;
use crate::fill::{FillOutcome, NoFillReason, ShapeFillMode};
use crate::rasterizer::{self, Composition};
use crate::session::{Confirm, Confirmation, Session};
use crate::settings::EditorSettings;
use crate::shape::{Shape, ShapeKind, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::tools::{Tool, ToolController};
use crate::view_transform::ViewTransform;

const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
const REDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);
const REDO_SHIFT: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::Z);
const ZOOM_STEP: f32 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    NewCanvas,
    Resize,
    Background,
}

/// State of the small canvas settings window.
#[derive(Debug, Clone, Copy)]
struct CanvasForm {
    kind: FormKind,
    width: u32,
    height: u32,
    transparent: bool,
    background: Color32,
}

impl CanvasForm {
    fn new(kind: FormKind, meta: CanvasMeta) -> Self {
        Self {
            kind,
            width: meta.width,
            height: meta.height,
            transparent: meta.background.is_none(),
            background: meta.background.unwrap_or(Color32::WHITE),
        }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            FormKind::NewCanvas => "New canvas",
            FormKind::Resize => "Canvas size",
            FormKind::Background => "Background",
        }
    }

    fn background(&self) -> Option<Color32> {
        (!self.transparent).then_some(self.background)
    }

    fn meta(&self) -> CanvasMeta {
        CanvasMeta {
            width: self.width,
            height: self.height,
            background: self.background(),
        }
    }
}

pub struct PaintApp {
    session: Session,
    settings: EditorSettings,
    tools: ToolController,
    view: ViewTransform,
    canvas_texture: Option<TextureHandle>,
    texture_revision: Option<u64>,
    form: Option<CanvasForm>,
    /// Document point under the pointer
    hover: Option<Pos2>,
    /// Canvas scroll position after the last frame
    scroll_offset: Vec2,
    /// Scroll position to apply next frame, set by zooming
    pending_scroll: Option<Vec2>,
    status: String,
    title: String,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<EditorSettings>(storage, eframe::APP_KEY))
            .unwrap_or_default()
            .sanitized();
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        let document = Document::with_meta(settings.new_canvas()).unwrap_or_default();
        let editor = Editor::with_options(
            document,
            settings.history_capacity,
            settings.fill_options(),
        );
        Self {
            session: Session::new(editor),
            tools: ToolController::new(settings.tool),
            settings,
            view: ViewTransform::default(),
            canvas_texture: None,
            texture_revision: None,
            form: None,
            hover: None,
            scroll_offset: Vec2::ZERO,
            pending_scroll: None,
            status: "Ready".to_string(),
            title: String::new(),
        }
    }

    fn apply(&mut self, command: Command) {
        match self.session.execute(&command) {
            Ok(changed) => {
                self.status = match (&command, self.session.editor().last_fill()) {
                    (Command::Fill { .. }, Some(outcome)) => describe_fill(outcome),
                    _ if changed => command.name().to_string(),
                    _ => format!("{}: nothing changed", command.name()),
                }
            }
            Err(err) => self.fail(command.name(), err),
        }
    }

    fn undo(&mut self) {
        self.tools.cancel();
        match self.session.undo() {
            Ok(()) => self.status = "Undo".to_string(),
            Err(err) => self.fail("Undo", err),
        }
    }

    fn redo(&mut self) {
        self.tools.cancel();
        match self.session.redo() {
            Ok(()) => self.status = "Redo".to_string(),
            Err(err) => self.fail("Redo", err),
        }
    }

    fn fail(&mut self, action: &str, err: EditorError) {
        self.status = format!("{action}: {err}");
        if err.is_noop() {
            return;
        }
        log::warn!("{action} failed: {err}");
        dialogs::show_error(action, &err.to_string());
    }

    fn open(&mut self) {
        self.tools.cancel();
        let (mut confirm, mut files) = (NativeDialogs, NativeDialogs);
        match self.session.open(&mut confirm, &mut files) {
            Ok(true) => self.status = format!("Opened {}", self.session.title()),
            Ok(false) => {}
            Err(err) => self.fail("Open", err),
        }
    }

    fn save(&mut self, save_as: bool) {
        let mut files = NativeDialogs;
        let result = if save_as {
            self.session.save_as(&mut files)
        } else {
            self.session.save(&mut files)
        };
        match result {
            Ok(true) => self.status = format!("Saved {}", self.session.title()),
            Ok(false) => {}
            Err(err) => self.fail("Save", err),
        }
    }

    fn export(&mut self) {
        match self.session.export(&mut NativeDialogs) {
            Ok(Some(path)) => self.status = format!("Exported {}", path.display()),
            Ok(None) => {}
            Err(err) => self.fail("Export", err),
        }
    }

    fn submit_form(&mut self, form: CanvasForm) {
        match form.kind {
            FormKind::NewCanvas => {
                self.tools.cancel();
                let (mut confirm, mut files) = (NativeDialogs, NativeDialogs);
                match self
                    .session
                    .new_document(form.meta(), &mut confirm, &mut files)
                {
                    Ok(true) => {
                        self.settings.canvas_width = form.width;
                        self.settings.canvas_height = form.height;
                        self.settings.canvas_background = form.background();
                        self.status = format!("New canvas {}x{}", form.width, form.height);
                    }
                    Ok(false) => {}
                    Err(err) => self.fail("New canvas", err),
                }
            }
            FormKind::Resize => self.apply(Command::ResizeInPlace {
                width: form.width,
                height: form.height,
            }),
            FormKind::Background => self.apply(Command::SetBackground(form.background())),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Ctrl+Shift+Z first: the plain Ctrl+Z shortcut also matches it.
        let (redo_shift, undo, redo, debug, escape) = ctx.input_mut(|i| {
            (
                i.consume_shortcut(&REDO_SHIFT),
                i.consume_shortcut(&UNDO),
                i.consume_shortcut(&REDO),
                i.consume_key(Modifiers::NONE, Key::F12),
                i.consume_key(Modifiers::NONE, Key::Escape),
            )
        });
        if redo_shift || redo {
            self.redo();
        } else if undo {
            self.undo();
        }
        if debug {
            self.settings.debug_overlay = !self.settings.debug_overlay;
        }
        if escape {
            self.tools.cancel();
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New…").clicked() {
                    self.form = Some(CanvasForm::new(FormKind::NewCanvas, self.settings.new_canvas()));
                    ui.close_menu();
                }
                if ui.button("Open…").clicked() {
                    ui.close_menu();
                    self.open();
                }
                if ui.button("Save").clicked() {
                    ui.close_menu();
                    self.save(false);
                }
                if ui.button("Save As…").clicked() {
                    ui.close_menu();
                    self.save(true);
                }
                ui.separator();
                if ui.button("Export…").clicked() {
                    ui.close_menu();
                    self.export();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(ViewportCommand::Close);
                }
            });
            ui.menu_button("Edit", |ui| {
                let editor = self.session.editor();
                let (can_undo, can_redo) = (editor.can_undo(), editor.can_redo());
                if ui
                    .add_enabled(can_undo, egui::Button::new("Undo").shortcut_text(ui.ctx().format_shortcut(&UNDO)))
                    .clicked()
                {
                    ui.close_menu();
                    self.undo();
                }
                if ui
                    .add_enabled(can_redo, egui::Button::new("Redo").shortcut_text(ui.ctx().format_shortcut(&REDO)))
                    .clicked()
                {
                    ui.close_menu();
                    self.redo();
                }
                ui.separator();
                if ui.button("Clear").clicked() {
                    ui.close_menu();
                    self.tools.cancel();
                    self.apply(Command::Clear);
                }
            });
            ui.menu_button("Canvas", |ui| {
                let meta = self.session.editor().document().meta();
                if ui.button("Size…").clicked() {
                    self.form = Some(CanvasForm::new(FormKind::Resize, meta));
                    ui.close_menu();
                }
                if ui.button("Background…").clicked() {
                    self.form = Some(CanvasForm::new(FormKind::Background, meta));
                    ui.close_menu();
                }
            });
            ui.menu_button("View", |ui| {
                if ui.button("Zoom in").clicked() {
                    self.view.set_zoom(self.view.zoom() * ZOOM_STEP);
                }
                if ui.button("Zoom out").clicked() {
                    self.view.set_zoom(self.view.zoom() / ZOOM_STEP);
                }
                if ui.button("Actual size").clicked() {
                    self.view.set_zoom(1.0);
                    ui.close_menu();
                }
                ui.separator();
                ui.checkbox(&mut self.settings.debug_overlay, "Fill debug overlay (F12)");
            });
        });
    }

    fn tool_bar(&mut self, ui: &mut egui::Ui) {
        let before = self.settings.clone();
        ui.horizontal_wrapped(|ui| {
            for tool in Tool::ALL {
                ui.selectable_value(&mut self.settings.tool, tool, tool.name());
            }
            ui.separator();

            ui.label("Stroke");
            color_edit_button_srgba(ui, &mut self.settings.stroke_color, Alpha::Opaque);
            ui.add(
                egui::Slider::new(&mut self.settings.stroke_width, MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH)
                    .text("width"),
            );
            ui.separator();

            ui.label("Fill");
            let mut fill = self.settings.fill_color.unwrap_or(Color32::WHITE);
            if color_edit_button_srgba(ui, &mut fill, Alpha::Opaque).changed() {
                self.settings.fill_color = Some(fill);
            }
            ui.checkbox(&mut self.settings.fill_new_shapes, "Fill new shapes");
            ui.separator();

            egui::ComboBox::from_label("Bucket on shapes")
                .selected_text(fill_mode_label(self.settings.shape_fill_mode))
                .show_ui(ui, |ui| {
                    for mode in [
                        ShapeFillMode::FilledShapes,
                        ShapeFillMode::AllShapes,
                        ShapeFillMode::RasterOnly,
                    ] {
                        ui.selectable_value(
                            &mut self.settings.shape_fill_mode,
                            mode,
                            fill_mode_label(mode),
                        );
                    }
                });
        });

        if self.settings.tool != before.tool {
            self.tools.set_tool(self.settings.tool);
        }
        if self.settings.fill_options() != before.fill_options() {
            self.session.set_fill_options(self.settings.fill_options());
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(&self.status);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let doc = self.session.editor().document();
                ui.label(format!("{:.0}%", self.view.zoom() * 100.0));
                ui.label(format!("{}x{}", doc.width(), doc.height()));
                if let Some(p) = self.hover {
                    ui.label(format!("({:.0}, {:.0})", p.x, p.y));
                }
            });
        });
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let revision = self.session.revision();
        if self.canvas_texture.is_some() && self.texture_revision == Some(revision) {
            return;
        }
        let buffer = rasterizer::render(
            self.session.editor().document(),
            Composition::Export { keep_alpha: true },
        );
        let image = ColorImage::from_rgba_unmultiplied(buffer.size(), buffer.as_raw());
        match &mut self.canvas_texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.canvas_texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
        self.texture_revision = Some(revision);
    }

    /// Draw the canvas and route pointer input to the active tool.
    /// Returns the document point under the pointer.
    fn canvas(&mut self, ui: &mut egui::Ui) -> Option<Pos2> {
        self.refresh_texture(ui.ctx());
        let doc = self.session.editor().document();
        let size = egui::vec2(doc.width() as f32, doc.height() as f32);

        let (response, painter) = ui.allocate_painter(size * self.view.zoom(), Sense::click_and_drag());
        self.view.origin = response.rect.min;

        if response.hovered() {
            let zoom_delta = ui.input(|i| i.zoom_delta());
            if zoom_delta != 1.0 {
                if let Some(pointer) = response.hover_pos() {
                    let shift = self.view.zoom_about(pointer, zoom_delta);
                    self.pending_scroll = Some(self.scroll_offset - shift);
                }
            }
        }

        let canvas_rect = response.rect;
        if self.session.editor().document().background().is_none() {
            paint_checkerboard(&painter, canvas_rect);
        }
        if let Some(texture) = &self.canvas_texture {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.image(texture.id(), canvas_rect, uv, Color32::WHITE);
        }

        let (pressed, down, released, shift, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.modifiers.shift,
                i.pointer.interact_pos(),
            )
        });
        let visible_canvas = ui.clip_rect().intersect(canvas_rect);
        let over_canvas = pointer
            .filter(|p| visible_canvas.contains(*p))
            .map(|p| self.view.to_document(p));

        match pointer.map(|p| self.view.to_document(p)) {
            Some(at) => {
                if pressed && response.hovered() {
                    if let Some(command) = self.tools.press(at, self.settings.brush()) {
                        self.apply(command);
                    }
                } else if down && self.tools.is_active() {
                    self.tools.drag(at, shift);
                }
            }
            // Pointer left the window mid-gesture.
            None => self.tools.cancel(),
        }
        if released && self.tools.is_active() {
            if let Some(command) = self.tools.release_at(over_canvas, shift) {
                self.apply(command);
            }
        }

        if let Some(preview) = self.tools.preview() {
            paint_shape(&painter, &self.view, &preview);
        }
        if self.settings.debug_overlay {
            if let Some(outcome) = self.session.editor().last_fill() {
                paint_fill_markers(&painter, &self.view, outcome);
            }
        }

        response.hover_pos().map(|p| self.view.to_document(p))
    }

    fn form_window(&mut self, ctx: &egui::Context) {
        let Some(mut form) = self.form else {
            return;
        };
        let mut submit = false;
        let mut close = false;
        egui::Window::new(form.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Grid::new("canvas_form").num_columns(2).show(ui, |ui| {
                    if form.kind != FormKind::Background {
                        ui.label("Width");
                        ui.add(egui::DragValue::new(&mut form.width).range(1..=MAX_CANVAS_SIDE).suffix(" px"));
                        ui.end_row();
                        ui.label("Height");
                        ui.add(egui::DragValue::new(&mut form.height).range(1..=MAX_CANVAS_SIDE).suffix(" px"));
                        ui.end_row();
                    }
                    if form.kind != FormKind::Resize {
                        ui.label("Background");
                        ui.horizontal(|ui| {
                            ui.checkbox(&mut form.transparent, "Transparent");
                            ui.add_enabled_ui(!form.transparent, |ui| {
                                color_edit_button_srgba(ui, &mut form.background, Alpha::Opaque);
                            });
                        });
                        ui.end_row();
                    }
                });
                ui.horizontal(|ui| {
                    submit = ui.button("OK").clicked();
                    close = ui.button("Cancel").clicked();
                });
            });

        if submit {
            self.form = None;
            self.submit_form(form);
        } else if close {
            self.form = None;
        } else {
            self.form = Some(form);
        }
    }

    fn debug_window(&mut self, ctx: &egui::Context) {
        let mut open = self.settings.debug_overlay;
        egui::Window::new("Fill debug").open(&mut open).show(ctx, |ui| {
            let editor = self.session.editor();
            let history = editor.history();
            ui.label(format!(
                "History: {} / {} (redo: {})",
                history.len(),
                history.capacity(),
                if history.can_redo() { "yes" } else { "no" }
            ));
            ui.label(format!("Shapes: {}", editor.document().shapes().len()));
            match editor.last_fill() {
                Some(FillOutcome::Raster { seed, painted, nudge }) => {
                    ui.label(format!("Seed: {:?}, painted {} px", seed, painted));
                    if let Some(nudge) = nudge {
                        ui.label(format!(
                            "Nudged: clicked {:?}, path {:?}, seed {:?}",
                            nudge.clicked, nudge.projection, nudge.seed
                        ));
                    }
                }
                Some(outcome) => {
                    ui.label(describe_fill(outcome));
                }
                None => {
                    ui.label("No fill yet");
                }
            }
        });
        self.settings.debug_overlay = open;
    }

    /// Ask about unsaved changes when the window is closed.
    fn handle_close(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        if !self.session.is_dirty() || !self.session.editor().document().has_content() {
            return;
        }
        let answer = NativeDialogs.ask(
            "Quit",
            "The drawing has unsaved changes. Quit without saving?\n\nYes: quit\nNo: save first\nCancel: go back",
        );
        let keep_open = match answer {
            Confirmation::Yes => false,
            Confirmation::No => match self.session.save(&mut NativeDialogs) {
                Ok(saved) => !saved,
                Err(err) => {
                    self.fail("Save", err);
                    true
                }
            },
            Confirmation::Cancel => true,
        };
        if keep_open {
            ctx.send_viewport_cmd(ViewportCommand::CancelClose);
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ui));
        egui::TopBottomPanel::top("tool_bar").show(ctx, |ui| self.tool_bar(ui));

        // The status bar shows the pointer position from the previous frame.
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_bar(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut area = egui::ScrollArea::both();
            if let Some(offset) = self.pending_scroll.take() {
                area = area.scroll_offset(offset.max(Vec2::ZERO));
            }
            let output = area.show(ui, |ui| {
                self.hover = self.canvas(ui);
            });
            self.scroll_offset = output.state.offset;
        });

        self.form_window(ctx);
        if self.settings.debug_overlay {
            self.debug_window(ctx);
        }

        let title = format!("Bucket Paint - {}", self.session.title());
        if title != self.title {
            ctx.send_viewport_cmd(ViewportCommand::Title(title.clone()));
            self.title = title;
        }
        self.handle_close(ctx);
    }
}

fn fill_mode_label(mode: ShapeFillMode) -> &'static str {
    match mode {
        ShapeFillMode::FilledShapes => "Recolor filled shapes",
        ShapeFillMode::AllShapes => "Recolor any shape",
        ShapeFillMode::RasterOnly => "Paint pixels only",
    }
}

fn describe_fill(outcome: &FillOutcome) -> String {
    match outcome {
        FillOutcome::ShapeFilled { index } => format!("Filled shape #{index}"),
        FillOutcome::Raster { painted, .. } => format!("Filled {painted} pixels"),
        FillOutcome::Unchanged(NoFillReason::OutsideDocument) => "Fill: outside the canvas".to_string(),
        FillOutcome::Unchanged(NoFillReason::AlreadyFilled) => "Fill: already that color".to_string(),
        FillOutcome::Unchanged(NoFillReason::SeedOnWall) => "Fill: no room beside the line".to_string(),
    }
}

fn paint_checkerboard(painter: &Painter, rect: Rect) {
    const CELL: f32 = 12.0;
    painter.rect_filled(rect, 0.0, Color32::from_gray(250));
    let clip = painter.clip_rect().intersect(rect);
    let (cols, rows) = ((rect.width() / CELL).ceil() as i32, (rect.height() / CELL).ceil() as i32);
    for row in 0..rows {
        for col in (row % 2..cols).step_by(2) {
            let min = rect.min + egui::vec2(col as f32 * CELL, row as f32 * CELL);
            let cell = Rect::from_min_size(min, egui::vec2(CELL, CELL)).intersect(rect);
            if cell.intersects(clip) {
                painter.rect_filled(cell, 0.0, Color32::from_gray(210));
            }
        }
    }
}

/// Draw a shape in screen space (used for the gesture preview).
fn paint_shape(painter: &Painter, view: &ViewTransform, shape: &Shape) {
    let stroke = Stroke::new(shape.width() as f32 * view.zoom(), shape.stroke_color());
    match shape.kind() {
        ShapeKind::Stroke(points) => {
            painter.line(points.iter().map(|p| view.to_screen(*p)).collect(), stroke);
        }
        ShapeKind::Line { start, end } => {
            painter.line_segment([view.to_screen(*start), view.to_screen(*end)], stroke);
        }
        ShapeKind::Rectangle { a, b } => {
            let rect = Rect::from_two_pos(view.to_screen(*a), view.to_screen(*b));
            painter.rect(rect, 0.0, shape.fill().unwrap_or(Color32::TRANSPARENT), stroke);
        }
        ShapeKind::Ellipse { a, b } => {
            let rect = Rect::from_two_pos(view.to_screen(*a), view.to_screen(*b));
            let radius = rect.size() / 2.0;
            if let Some(fill) = shape.fill() {
                painter.add(egui::Shape::ellipse_filled(rect.center(), radius, fill));
            }
            painter.add(egui::Shape::ellipse_stroke(rect.center(), radius, stroke));
        }
    }
}

/// Seed, path projection and nudged seed of the last raster fill.
fn paint_fill_markers(painter: &Painter, view: &ViewTransform, outcome: &FillOutcome) {
    let FillOutcome::Raster { seed, nudge, .. } = outcome else {
        return;
    };
    let seed = view.to_screen(Pos2::new(seed.0 as f32, seed.1 as f32));
    painter.circle_stroke(seed, 5.0, Stroke::new(1.5, Color32::GREEN));
    if let Some(nudge) = nudge {
        let clicked = view.to_screen(nudge.clicked);
        let projection = view.to_screen(nudge.projection);
        painter.circle_filled(clicked, 3.0, Color32::RED);
        painter.circle_filled(projection, 3.0, Color32::BLUE);
        painter.line_segment([projection, seed], Stroke::new(1.0, Color32::BLUE));
    }
}
