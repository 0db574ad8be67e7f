//! Live equalizer session
//!
//! The capture thread renders every block straight into the terminal.
//! The main thread only polls keys, watches for resizes and waits for
//! stream errors. Both sides share one `Display` behind a mutex.

use crate::bands::BandTable;
use crate::capture;
use crate::colors::ColorState;
use crate::config::{Calibration, EqConfig};
use crate::equalizer::{base_row_for_height, Equalizer};
use crate::error::EqError;
use crate::help::{render_help_overlay, HELP};
use crate::terminal::{poll_key, Surface, Terminal};
use crossterm::event::KeyCode;
use log::{error, info, warn};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Key poll interval for the main thread
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything touched while drawing a frame.
pub struct Display<S> {
    equalizer: Equalizer,
    term: S,
    colors: ColorState,
    show_help: bool,
}

impl<S: Surface> Display<S> {
    pub fn new(equalizer: Equalizer, term: S, colors: ColorState) -> Self {
        Self {
            equalizer,
            term,
            colors,
            show_help: false,
        }
    }

    /// Build the bars for the capture rate, anchored to the current height.
    fn configure(&mut self, sample_rate: f64) -> Result<(), EqError> {
        let (_, height) = self.term.size();
        self.equalizer.configure(sample_rate, base_row_for_height(height))
    }

    /// Draw one block, plus the help overlay when enabled.
    fn render_block(&mut self, samples: &[f32]) -> Result<(), EqError> {
        let palette = self.colors.palette();
        self.equalizer.render_block(samples, &mut self.term, &palette)?;

        if self.show_help {
            let (width, height) = self.term.size();
            render_help_overlay(&mut self.term, width, height, HELP);
        }
        self.term.flush()?;
        Ok(())
    }

    /// Handle a key, returns true if should quit
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char('r') => self.equalizer.reset(),
            _ => {
                self.colors.handle_key(code);
            }
        }
        false
    }
}

impl Display<Terminal> {
    fn resize(&mut self, width: u16, height: u16) -> Result<(), EqError> {
        self.term.resize(width, height);
        self.term.clear_screen()?;
        self.equalizer.resize(base_row_for_height(height));
        Ok(())
    }
}

/// Run until the user quits or the stream fails.
pub fn run(config: &EqConfig, bands: BandTable, calibration: Calibration) -> Result<(), EqError> {
    let term = Terminal::new()?;
    let (mut width, mut height) = term.size();

    let display = Arc::new(Mutex::new(Display::new(
        Equalizer::new(bands, calibration),
        term,
        ColorState::new(config.color_scheme),
    )));

    let (err_tx, err_rx) = mpsc::channel();

    let sink_display = Arc::clone(&display);
    let mut capture = capture::open(
        config,
        move |block| {
            if let Ok(mut display) = sink_display.lock() {
                if let Err(e) = display.render_block(block) {
                    warn!("Frame dropped: {}", e);
                }
            }
        },
        err_tx,
    )?;

    info!(
        "Capturing from {} at {} Hz, {} samples per block",
        capture.device_name, capture.sample_rate, capture.block_len
    );

    if let Ok(mut d) = display.lock() {
        d.configure(capture.sample_rate)?;
    }
    capture.play()?;

    loop {
        match err_rx.try_recv() {
            Ok(e) => {
                error!("Stopping: {}", e);
                return Err(e);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((width, height));
        if (w, h) != (width, height) {
            width = w;
            height = h;
            if let Ok(mut d) = display.lock() {
                d.resize(w, h)?;
            }
        }

        if let Some((code, _mods)) = poll_key(KEY_POLL_INTERVAL)? {
            let quit = display.lock().map(|mut d| d.handle_key(code)).unwrap_or(true);
            if quit {
                break;
            }
        }
    }

    // Stop callbacks before the terminal is restored
    drop(capture);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equalizer::PipelineState;
    use crate::terminal::FrameBuffer;

    fn display(width: u16, height: u16) -> Display<FrameBuffer> {
        Display::new(
            Equalizer::new(BandTable::default(), Calibration::default()),
            FrameBuffer::new(width, height),
            ColorState::new(0),
        )
    }

    #[test]
    fn configured_display_draws_first_block() {
        let mut d = display(100, 24);
        d.configure(48000.0).unwrap();
        d.render_block(&vec![0.5; 2400]).unwrap();
        assert_eq!(d.equalizer.state(), PipelineState::Running);
        assert!(d.equalizer.band_bars().iter().all(|b| b.base_row() == 21));
        assert!(d.term.rows().flatten().any(|c| c.ch != ' '));
    }

    #[test]
    fn unconfigured_display_drops_blocks() {
        let mut d = display(100, 24);
        assert!(matches!(d.render_block(&[0.0; 64]), Err(EqError::NotConfigured)));
        assert!(d.term.rows().flatten().all(|c| c.ch == ' '));
    }

    #[test]
    fn quit_and_help_keys() {
        let mut d = display(100, 24);
        assert!(!d.handle_key(KeyCode::Char('?')));
        assert!(d.show_help);
        assert!(d.handle_key(KeyCode::Char('q')));
        assert!(d.handle_key(KeyCode::Esc));
    }
}
