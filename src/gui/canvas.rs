use crate::draw::model::{Color, Point, Position};
use crate::session::Session;
use eframe::egui::{
    self, Color32, ColorImage, PointerButton, Pos2, Rect, RichText, Sense, TextureHandle,
    TextureOptions, Vec2,
};

pub fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Keeps the GPU copy of the raster in step with the surface.
#[derive(Default)]
pub struct CanvasTexture {
    texture: Option<TextureHandle>,
    revision: Option<u64>,
}

impl CanvasTexture {
    fn sync(&mut self, ctx: &egui::Context, session: &mut Session) -> egui::TextureId {
        let surface = session.surface_mut();
        let revision = surface.revision();
        let dirty = surface.take_dirty();
        let buffer = surface.buffer();
        let size = [buffer.width as usize, buffer.height as usize];

        if self.revision != Some(revision) || self.texture.is_none() {
            match (self.texture.as_mut(), dirty) {
                (Some(texture), Some(rect)) if texture.size() == size => {
                    let patch = ColorImage::from_rgba_unmultiplied(
                        [rect.width() as usize, rect.height() as usize],
                        &buffer.region(rect),
                    );
                    texture.set_partial(
                        [rect.x0 as usize, rect.y0 as usize],
                        patch,
                        TextureOptions::NEAREST,
                    );
                }
                (Some(texture), _) => {
                    let image = ColorImage::from_rgba_unmultiplied(size, &buffer.pixels);
                    texture.set(image, TextureOptions::NEAREST);
                }
                (None, _) => {
                    let image = ColorImage::from_rgba_unmultiplied(size, &buffer.pixels);
                    self.texture =
                        Some(ctx.load_texture("sketch-canvas", image, TextureOptions::NEAREST));
                }
            }
            self.revision = Some(revision);
        }
        match &self.texture {
            Some(texture) => texture.id(),
            None => egui::TextureId::default(),
        }
    }
}

fn to_surface(rect: Rect, pos: Pos2) -> Point {
    Point::new(
        (pos.x - rect.min.x).round() as i32,
        (pos.y - rect.min.y).round() as i32,
    )
}

/// Paints the sketch and routes pointer input to the stroke operations.
/// Returns the canvas rect in screen space.
pub fn show_canvas(
    ui: &mut egui::Ui,
    session: &mut Session,
    texture: &mut CanvasTexture,
) -> Rect {
    let size = Vec2::new(
        session.surface().width() as f32,
        session.surface().height() as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::drag());
    let rect = response.rect;

    painter.rect_filled(rect, 0.0, color32(session.surface().background()));
    let texture_id = texture.sync(ui.ctx(), session);
    painter.image(
        texture_id,
        rect,
        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
        Color32::WHITE,
    );

    if response.drag_started_by(PointerButton::Primary) {
        let origin = ui
            .ctx()
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(origin) = origin {
            session.begin_stroke(to_surface(rect, origin));
        }
    }
    if response.dragged_by(PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            if rect.contains(pos) {
                session.extend_stroke(to_surface(rect, pos));
            } else {
                // Leaving the canvas ends the stroke; re-entering does not
                // resume it.
                session.end_stroke();
            }
        }
    }
    if response.drag_stopped_by(PointerButton::Primary) {
        session.end_stroke();
    }

    rect
}

/// Draws every annotation as a movable overlay and reports drops back to the
/// session.
pub fn show_annotations(ctx: &egui::Context, session: &mut Session, canvas: Rect) {
    let mut dropped = None;
    for (index, annotation) in session.annotations().iter().enumerate() {
        let default_pos = canvas.min + Vec2::new(annotation.position.x, annotation.position.y);
        let shown = egui::Area::new(egui::Id::new(("annotation", annotation.id)))
            .default_pos(default_pos)
            .movable(true)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::same(8.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(&annotation.text)
                                .size(28.0)
                                .color(Color32::WHITE),
                        )
                        .on_hover_text(annotation.latex());
                    });
            });
        if shown.response.drag_stopped() {
            let offset = shown.response.rect.min - canvas.min;
            dropped = Some((index, Position::new(offset.x, offset.y)));
        }
    }
    if let Some((index, position)) = dropped {
        session.drag_annotation(index, position);
    }
}
