//! Presents a [`PixelCanvas`] on a terminal.
//!
//! Every character cell shows two vertically stacked pixels through the upper
//! half block `▀`: the foreground colour paints the top pixel and the
//! background colour the bottom one. Only cells that changed since the last
//! frame are written.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};

use crate::graphics::{DrawSurface, PixelCanvas, Rgb};

const HALF_BLOCK: char = '▀';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
}

/// A pixel canvas sized to a terminal, with diffed output
pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    canvas: PixelCanvas,
    prev: Vec<Option<Cell>>,
    next: Vec<Cell>,
    overlay: Option<String>,
}

impl TerminalCanvas {
    /// `cell_px` is the number of world units covered by one half-block pixel
    pub fn new(cols: u16, rows: u16, cell_px: f64, background: Rgb) -> Self {
        let (width, height) = (cols as usize, rows as usize * 2);
        let canvas = PixelCanvas::new(width, height, 1.0 / cell_px, background);
        let mut terminal = TerminalCanvas {
            cols,
            rows,
            canvas,
            prev: Vec::new(),
            next: Vec::new(),
            overlay: None,
        };
        terminal.resize(cols, rows);
        terminal
    }

    /// Resizes the canvas and forces a full repaint
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.canvas.resize(cols as usize, rows as usize * 2);
        let n = cols as usize * rows as usize;
        self.prev = vec![None; n];
        self.next = Vec::with_capacity(n);
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    /// Text drawn over the first row on the next present, if any
    pub fn set_overlay(&mut self, text: Option<String>) {
        self.overlay = text;
    }

    fn compose(&mut self) {
        self.next.clear();
        for row in 0..self.rows as usize {
            for col in 0..self.cols as usize {
                let top = self.canvas.pixel(col, row * 2);
                let bottom = self.canvas.pixel(col, row * 2 + 1);
                let (Some(fg), Some(bg)) = (top, bottom) else {
                    continue;
                };
                self.next.push(Cell { ch: HALF_BLOCK, fg, bg });
            }
        }

        if let Some(text) = &self.overlay {
            let fg = Rgb::new(255, 255, 255);
            let bg = Rgb::new(0, 0, 0);
            for (i, ch) in text.chars().take(self.cols as usize).enumerate() {
                if let Some(cell) = self.next.get_mut(i) {
                    *cell = Cell { ch, fg, bg };
                }
            }
        }
    }

    /// Writes the cells that changed since the previous present
    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.compose();
        queue!(out, BeginSynchronizedUpdate)?;

        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        let cols = self.cols as usize;
        for (i, cell) in self.next.iter().enumerate() {
            if self.prev[i] == Some(*cell) {
                continue;
            }
            queue!(out, cursor::MoveTo((i % cols) as u16, (i / cols) as u16))?;
            if last_bg != Some(cell.bg) {
                queue!(out, SetBackgroundColor(to_color(cell.bg)))?;
                last_bg = Some(cell.bg);
            }
            if last_fg != Some(cell.fg) {
                queue!(out, SetForegroundColor(to_color(cell.fg)))?;
                last_fg = Some(cell.fg);
            }
            queue!(out, Print(cell.ch))?;
            self.prev[i] = Some(*cell);
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

impl DrawSurface for TerminalCanvas {
    fn size(&self) -> (f64, f64) {
        self.canvas.size()
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Rgb, alpha: f64) {
        self.canvas.stroke_line(from, to, color, alpha);
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgb, alpha: f64) {
        self.canvas.fill_circle(center, radius, color, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(10, 10, 20);

    #[test]
    fn size_in_world_units() {
        let terminal = TerminalCanvas::new(80, 24, 8.0, BG);
        assert_eq!((terminal.cols(), terminal.rows()), (80, 24));
        assert_eq!(terminal.canvas().width(), 80);
        assert_eq!(terminal.canvas().height(), 48);
        assert_eq!(terminal.size(), (640.0, 384.0));
    }

    #[test]
    fn second_present_only_sends_changes() {
        let mut terminal = TerminalCanvas::new(4, 2, 1.0, BG);
        let mut first = Vec::new();
        terminal.present(&mut first).unwrap();
        let mut second = Vec::new();
        terminal.present(&mut second).unwrap();
        assert!(second.len() < first.len());
        assert!(!String::from_utf8_lossy(&second).contains(HALF_BLOCK));

        terminal.fill_circle([0.5, 0.5], 0.5, Rgb::new(255, 0, 0), 1.0);
        let mut third = Vec::new();
        terminal.present(&mut third).unwrap();
        assert_eq!(String::from_utf8_lossy(&third).matches(HALF_BLOCK).count(), 1);
    }

    #[test]
    fn overlay_replaces_first_row() {
        let mut terminal = TerminalCanvas::new(10, 2, 1.0, BG);
        terminal.set_overlay(Some("fps 60".into()));
        let mut out = Vec::new();
        terminal.present(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('f') && text.contains('6'));
        assert_eq!(text.matches(HALF_BLOCK).count(), 20 - 6);
    }

    #[test]
    fn resize_forces_full_repaint() {
        let mut terminal = TerminalCanvas::new(3, 1, 1.0, BG);
        terminal.present(&mut Vec::<u8>::new()).unwrap();
        terminal.resize(5, 2);
        assert_eq!((terminal.cols(), terminal.rows()), (5, 2));
        let mut out = Vec::new();
        terminal.present(&mut out).unwrap();
        assert_eq!(String::from_utf8_lossy(&out).matches(HALF_BLOCK).count(), 10);
    }
}
