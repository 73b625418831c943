use std::collections::BTreeSet;

use crate::controllers::screen::WidgetTree;
use crate::core::data::{Point, Size, WidgetId};
use crate::core::events::{Action, MouseButton, MouseButtonEvent, MouseMoveEvent, RuneEvent, ScrollEvent};
use crate::core::graphics::GraphicsContext;

const BOARD_ID: WidgetId = WidgetId(0);
const BACKGROUND: [u8; 4] = [24, 24, 32, 255];
const TILE_OFF: [u8; 4] = [60, 60, 72, 255];
const TILE_ON: [u8; 4] = [240, 190, 40, 255];
const TILE_HOVER: [u8; 4] = [110, 110, 130, 255];
const TILE_FOCUS: [u8; 4] = [80, 160, 240, 255];
const GAP: u32 = 2;

/// A grid of toggleable tiles. Click toggles a tile, scrolling moves the
/// focused tile, `c` clears the board and space toggles the focused tile.
///
/// Closing is refused while any tile is lit.
#[derive(Debug, Clone)]
pub struct TileBoard {
    columns: u32,
    rows: u32,
    size: Size,
    lit: BTreeSet<WidgetId>,
    hover: Option<WidgetId>,
    focus: WidgetId,
    tile: Size,
}

impl TileBoard {
    #[must_use]
    pub fn new(columns: u32, rows: u32, size: Size) -> Self {
        let mut board = Self {
            columns: columns.max(1),
            rows: rows.max(1),
            size,
            lit: BTreeSet::new(),
            hover: None,
            focus: WidgetId(1),
            tile: Size::default(),
        };
        board.perform_layout();
        board
    }

    #[must_use]
    pub fn is_lit(&self, tile: WidgetId) -> bool {
        self.lit.contains(&tile)
    }

    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.lit.len()
    }

    #[must_use]
    pub fn tile_size(&self) -> Size {
        self.tile
    }

    #[must_use]
    pub fn tile_count(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// Widget id of the tile at `column`, `row`. Tiles are numbered from 1.
    #[must_use]
    pub fn tile_at(&self, column: u32, row: u32) -> WidgetId {
        WidgetId(u64::from(row) * u64::from(self.columns) + u64::from(column) + 1)
    }

    fn toggle(&mut self, tile: WidgetId) {
        if !self.lit.remove(&tile) {
            self.lit.insert(tile);
        }
    }

    fn origin(&self, tile: WidgetId) -> (u32, u32) {
        let index = tile.0 - 1;
        let column = (index % u64::from(self.columns)) as u32;
        let row = (index / u64::from(self.columns)) as u32;
        (column * self.tile.width, row * self.tile.height)
    }

    fn color(&self, tile: WidgetId) -> [u8; 4] {
        if self.lit.contains(&tile) {
            TILE_ON
        } else if tile == self.focus {
            TILE_FOCUS
        } else if Some(tile) == self.hover {
            TILE_HOVER
        } else {
            TILE_OFF
        }
    }
}

impl WidgetTree for TileBoard {
    /// Paints the layout from the last resize. A framebuffer that has not
    /// caught up yet is clipped, never relaid out here.
    fn draw(&self, ctx: &mut dyn GraphicsContext) {
        let inner = Size::new(
            self.tile.width.saturating_sub(GAP),
            self.tile.height.saturating_sub(GAP),
        );

        let mut surface = ctx.surface();
        surface.fill(BACKGROUND);
        for tile in (1..=self.tile_count()).map(WidgetId) {
            let (x, y) = self.origin(tile);
            surface.fill_rect(x, y, inner.width, inner.height, self.color(tile));
        }
    }

    fn on_mouse_move(&mut self, target: Option<WidgetId>, _event: &MouseMoveEvent) -> bool {
        let target = target.filter(|id| *id != BOARD_ID);
        if self.hover == target {
            return false;
        }
        self.hover = target;
        true
    }

    fn on_mouse_button(&mut self, target: Option<WidgetId>, event: &MouseButtonEvent) -> bool {
        match (target, event.button, event.action) {
            (Some(tile), MouseButton::Left, Action::Press) if tile != BOARD_ID => {
                self.toggle(tile);
                self.focus = tile;
                true
            }
            _ => false,
        }
    }

    fn on_rune_event(&mut self, focus_path: &[WidgetId], event: &RuneEvent) -> bool {
        match event.rune {
            'c' => {
                let changed = !self.lit.is_empty();
                self.lit.clear();
                changed
            }
            ' ' => match focus_path.last() {
                Some(tile) if *tile != BOARD_ID => {
                    self.toggle(*tile);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn on_scroll_event(&mut self, _target: Option<WidgetId>, event: &ScrollEvent) -> bool {
        let count = self.tile_count();
        let step: i64 = if event.y > 0.0 {
            -1
        } else if event.y < 0.0 {
            1
        } else {
            return false;
        };

        let next = (self.focus.0 as i64 - 1 + step).rem_euclid(count as i64) + 1;
        self.focus = WidgetId(next as u64);
        true
    }

    fn on_resize_event(&mut self, size: Size) -> bool {
        self.size = size;
        self.perform_layout();
        true
    }

    fn on_close_event(&mut self) -> bool {
        self.lit.is_empty()
    }

    fn hit_test(&self, point: Point) -> Option<WidgetId> {
        if point.x < 0.0 || point.y < 0.0 || self.tile.is_empty() {
            return None;
        }

        let column = (point.x as u32) / self.tile.width;
        let row = (point.y as u32) / self.tile.height;
        if column >= self.columns || row >= self.rows {
            return Some(BOARD_ID).filter(|_| {
                point.x < f64::from(self.size.width) && point.y < f64::from(self.size.height)
            });
        }

        Some(self.tile_at(column, row))
    }

    fn focus_path(&self) -> Vec<WidgetId> {
        vec![BOARD_ID, self.focus]
    }

    fn perform_layout(&mut self) {
        self.tile = Size::new(self.size.width / self.columns, self.size.height / self.rows);
    }
}
