//! Containers that can hold multiple widgets.
//!
//! Padding is `(left, top, right, bottom)`.

use glam::{Vec2, Vec4};

use crate::{
    other::UpdateContext,
    render::ui::{
        uirenderer::UIRenderer,
        widgets::{LayoutContext, Widget},
    },
};

/// Alignment options for widgets within a container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Start,
    Center,
}

/// Justification options for widgets within a container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Justification {
    Start,
    Center,
}

fn main_axis_start(
    justification: Justification,
    cursor: f32,
    available: f32,
    content: f32,
    pad_start: f32,
    pad_end: f32,
) -> f32 {
    match justification {
        Justification::Start => cursor + pad_start,
        Justification::Center => cursor + pad_start + (available - pad_start - pad_end - content) / 2.0,
    }
}

fn cross_axis_offset(
    alignment: Alignment,
    available: f32,
    size: f32,
    pad_start: f32,
    pad_end: f32,
) -> f32 {
    match alignment {
        Alignment::Start => pad_start,
        Alignment::Center => pad_start + (available - pad_start - pad_end - size) / 2.0,
    }
}

/// A vertical column container that arranges its child widgets vertically.
pub struct Column {
    pub widgets: Vec<Box<dyn Widget>>,
    pub spacing: f32,
    pub alignment: Alignment,
    pub padding: Vec4,
    pub justification: Justification,
    pub min_size: Vec2,
    /// Drawn behind the children when set.
    pub background: Option<Vec4>,
    position: Vec2,
    size: Vec2,
}

impl Column {
    /// Creates a new `Column` container with the specified spacing, alignment, padding, and
    /// justification.
    pub fn new(
        spacing: f32,
        alignment: Alignment,
        padding: Vec4,
        justification: Justification,
    ) -> Self {
        Self {
            widgets: Vec::new(),
            spacing,
            alignment,
            padding,
            justification,
            min_size: Vec2::ZERO,
            background: None,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
        }
    }

    /// Adds a widget to the column.
    pub fn add_widget<T: Widget + 'static>(&mut self, widget: T) {
        self.widgets.push(Box::new(widget));
    }

    /// Gets a certain widget by index.
    pub fn get_widget<T: Widget + 'static>(&self, index: usize) -> Option<&T> {
        self.widgets.get(index)?.as_any().downcast_ref::<T>()
    }

    /// Gets a certain widget by index as mutable.
    pub fn get_widget_mut<T: Widget + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.widgets
            .get_mut(index)?
            .as_any_mut()
            .downcast_mut::<T>()
    }
}

impl Widget for Column {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for widget in &self.widgets {
            let size = widget.size_hint();
            width = width.max(size.x);
            height += size.y;
        }

        height += self.spacing * (self.widgets.len().saturating_sub(1)) as f32;
        width += self.padding.x + self.padding.z;
        height += self.padding.y + self.padding.w;

        Vec2::new(width, height).max(self.min_size)
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        let sizes = self.widgets.iter().map(|w| w.size_hint().y).sum::<f32>();
        let total_height =
            sizes + self.spacing * (self.widgets.len().saturating_sub(1)) as f32;

        let mut cursor_y = main_axis_start(
            self.justification,
            ctx.cursor.y,
            ctx.max_size.y,
            total_height,
            self.padding.y,
            self.padding.w,
        );

        for widget in self.widgets.iter_mut() {
            let widget_size = widget.size_hint();
            let offset_x = cross_axis_offset(
                self.alignment,
                ctx.max_size.x,
                widget_size.x,
                self.padding.x,
                self.padding.z,
            );

            widget.layout(&LayoutContext {
                max_size: widget_size,
                cursor: Vec2::new(ctx.cursor.x + offset_x, cursor_y),
            });
            cursor_y += widget_size.y + self.spacing;
        }

        self.position = ctx.cursor;
        self.size = Vec2::new(
            ctx.max_size.x,
            ctx.max_size
                .y
                .max(total_height + self.padding.y + self.padding.w),
        );
        self.size
    }

    fn update(&mut self, ctx: &UpdateContext) {
        for widget in &mut self.widgets {
            widget.update(ctx);
        }
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        if let Some(color) = self.background {
            ui_renderer.add_command(crate::render::ui::uirenderer::DrawCommand::color(
                self.position,
                self.size,
                color,
            ));
        }
        for widget in &self.widgets {
            widget.draw(ui_renderer);
        }
    }
}

/// A horizontal row container that arranges its child widgets horizontally.
pub struct Row {
    pub widgets: Vec<Box<dyn Widget>>,
    pub spacing: f32,
    pub alignment: Alignment,
    pub padding: Vec4,
    pub justification: Justification,
    pub min_size: Vec2,
}

impl Row {
    /// Creates a new `Row` container with the specified spacing, alignment, padding, and
    /// justification.
    pub fn new(
        spacing: f32,
        alignment: Alignment,
        padding: Vec4,
        justification: Justification,
    ) -> Self {
        Self {
            widgets: Vec::new(),
            spacing,
            alignment,
            padding,
            justification,
            min_size: Vec2::ZERO,
        }
    }

    /// Adds a widget to the row.
    pub fn add_widget<T: Widget + 'static>(&mut self, widget: T) {
        self.widgets.push(Box::new(widget));
    }

    /// Gets a certain widget by index.
    pub fn get_widget<T: Widget + 'static>(&self, index: usize) -> Option<&T> {
        self.widgets.get(index)?.as_any().downcast_ref::<T>()
    }

    /// Gets a certain widget by index as mutable.
    pub fn get_widget_mut<T: Widget + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.widgets
            .get_mut(index)?
            .as_any_mut()
            .downcast_mut::<T>()
    }
}

impl Widget for Row {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for widget in &self.widgets {
            let size = widget.size_hint();
            width += size.x;
            height = height.max(size.y);
        }

        width += self.spacing * (self.widgets.len().saturating_sub(1)) as f32;
        width += self.padding.x + self.padding.z;
        height += self.padding.y + self.padding.w;

        Vec2::new(width, height).max(self.min_size)
    }

    fn update(&mut self, ctx: &UpdateContext) {
        for widget in &mut self.widgets {
            widget.update(ctx);
        }
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        let sizes = self.widgets.iter().map(|w| w.size_hint().x).sum::<f32>();
        let total_width =
            sizes + self.spacing * (self.widgets.len().saturating_sub(1)) as f32;

        let mut cursor_x = main_axis_start(
            self.justification,
            ctx.cursor.x,
            ctx.max_size.x,
            total_width,
            self.padding.x,
            self.padding.z,
        );

        for widget in self.widgets.iter_mut() {
            let widget_size = widget.size_hint();
            let offset_y = cross_axis_offset(
                self.alignment,
                ctx.max_size.y,
                widget_size.y,
                self.padding.y,
                self.padding.w,
            );

            widget.layout(&LayoutContext {
                max_size: widget_size,
                cursor: Vec2::new(cursor_x, ctx.cursor.y + offset_y),
            });
            cursor_x += widget_size.x + self.spacing;
        }

        Vec2::new(
            total_width + self.padding.x + self.padding.z,
            ctx.max_size.y,
        )
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        for widget in &self.widgets {
            widget.draw(ui_renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ui::widgets::Spacer;

    #[test]
    fn column_stacks_children_with_spacing() {
        let mut column = Column::new(
            5.0,
            Alignment::Start,
            Vec4::new(2.0, 4.0, 2.0, 4.0),
            Justification::Start,
        );
        column.add_widget(Spacer::new(Vec2::new(10.0, 20.0)));
        column.add_widget(Spacer::new(Vec2::new(30.0, 10.0)));

        assert_eq!(column.size_hint(), Vec2::new(34.0, 43.0));
        let size = column.layout(&LayoutContext {
            max_size: Vec2::new(100.0, 200.0),
            cursor: Vec2::new(1.0, 1.0),
        });
        assert_eq!(size, Vec2::new(100.0, 200.0));
    }

    #[test]
    fn row_centres_children_vertically() {
        let mut row = Row::new(0.0, Alignment::Center, Vec4::ZERO, Justification::Start);
        row.add_widget(Spacer::new(Vec2::new(10.0, 20.0)));
        row.layout(&LayoutContext {
            max_size: Vec2::new(100.0, 60.0),
            cursor: Vec2::ZERO,
        });
        let spacer = row.get_widget::<Spacer>(0).unwrap();
        assert_eq!(spacer.position, Vec2::new(0.0, 20.0));
    }

    #[test]
    fn centred_column_splits_leftover_height() {
        let mut column = Column::new(
            10.0,
            Alignment::Center,
            Vec4::new(0.0, 4.0, 0.0, 4.0),
            Justification::Center,
        );
        column.add_widget(Spacer::new(Vec2::new(20.0, 30.0)));
        column.add_widget(Spacer::new(Vec2::new(20.0, 30.0)));
        column.layout(&LayoutContext {
            max_size: Vec2::new(100.0, 200.0),
            cursor: Vec2::new(0.0, 0.0),
        });
        // 70 of content in 192 of inner height leaves 61 above.
        assert_eq!(column.get_widget::<Spacer>(0).unwrap().position, Vec2::new(40.0, 65.0));
        assert_eq!(column.get_widget::<Spacer>(1).unwrap().position, Vec2::new(40.0, 105.0));
    }
}
