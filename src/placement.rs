//! Where each signature image lands on its page, in PDF user space (points,
//! origin bottom-left).

use crate::assignment::{LayoutMode, SignatureAssignmentConfig};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rectangle {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Operands of the `cm` operator that maps the unit square of an image
    /// XObject onto this rectangle: `[w 0 0 h x y]`.
    pub fn transformation_matrix(&self) -> [f64; 6] {
        [self.width(), 0.0, 0.0, self.height(), self.x1, self.y1]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub signature_id: i64,
    pub page: i64,
    pub order: i64,
    pub layout_mode: LayoutMode,
    pub rect: Rectangle,
}

/// Resolve the rectangles of every visible assignment.
///
/// Assignments are walked by page, then by order. `ABS` entries sit at their
/// own coordinates. The first `STACK` entry of a page anchors at its own
/// coordinates and each following one goes `gapY` below the previous one;
/// `COLUMN` entries do the same to the right, spaced by `gapX`.
pub fn resolve_layout(assignments: &[(i64, SignatureAssignmentConfig)]) -> Vec<Placement> {
    let mut visible: Vec<&(i64, SignatureAssignmentConfig)> = assignments
        .iter()
        .filter(|(_, config)| config.visible)
        .collect();
    visible.sort_by_key(|(signature_id, config)| (config.page, config.order, *signature_id));

    let mut placements = Vec::with_capacity(visible.len());
    let mut current_page = None;
    // Previous rectangle and its gap, per flowing mode.
    let mut last_stack: Option<(Rectangle, f64)> = None;
    let mut last_column: Option<(Rectangle, f64)> = None;

    for (signature_id, config) in visible {
        if current_page != Some(config.page) {
            current_page = Some(config.page);
            last_stack = None;
            last_column = None;
        }
        let rect = match config.layout_mode {
            LayoutMode::Abs => Rectangle::new(config.pos_x, config.pos_y, config.width, config.height),
            LayoutMode::Stack => {
                let rect = match last_stack {
                    Some((prev, gap_y)) => Rectangle::new(
                        prev.x1,
                        prev.y1 - gap_y - config.height,
                        config.width,
                        config.height,
                    ),
                    None => Rectangle::new(config.pos_x, config.pos_y, config.width, config.height),
                };
                last_stack = Some((rect, config.gap_y));
                rect
            }
            LayoutMode::Column => {
                let rect = match last_column {
                    Some((prev, gap_x)) => Rectangle::new(
                        prev.x2 + gap_x,
                        prev.y1,
                        config.width,
                        config.height,
                    ),
                    None => Rectangle::new(config.pos_x, config.pos_y, config.width, config.height),
                };
                last_column = Some((rect, config.gap_x));
                rect
            }
        };
        placements.push(Placement {
            signature_id: *signature_id,
            page: config.page,
            order: config.order,
            layout_mode: config.layout_mode,
            rect,
        });
    }
    placements
}
