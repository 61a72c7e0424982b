/*
 *  main.rs
 *
 *  MidiMon - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Desktop runner: replays a script against an in-memory panel
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::{Context, Result};
use clap::Parser;
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use env_logger::Env;
use log::{info, warn};

use midimon::config::{self, Cli, Config};
use midimon::display::{CharacterLcd, DisplayError, FrameBuffer, GraphicalLcd, LcdKind, LcdSurface};
use midimon::meter::MeterLayout;
use midimon::pacer::Pacer;
use midimon::panel::FrontPanel;
use midimon::script::Script;
use midimon::ticks::millis_to_ticks;
use midimon::ui::ImageId;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const LOGO_IMAGE: ImageId = ImageId(1);

// played when no --script is given
const DEMO_SCRIPT: &str = "
hold_ms: 1500
events:
  - at_ms: 0
    image: 1
  - at_ms: 1500
    message: { text: Loading SoundFont, spinner: true }
  - at_ms: 2500
    clear_spinner: true
  - at_ms: 2500
    midi: [0x90, 36, 127]
  - at_ms: 2500
    midi: [0x99, 38, 110]
  - at_ms: 2600
    midi: [0x91, 64, 90]
  - at_ms: 2700
    midi: [0x92, 67, 70]
  - at_ms: 3000
    midi: [0x80, 36, 0]
  - at_ms: 3200
    midi: [0xB2, 7, 60]
";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        let yaml = serde_yaml::to_string(&cfg).context("serializing configuration")?;
        println!("{yaml}");
        return Ok(());
    }

    let default_level = if cli.debug { "debug" } else { cfg.log_level.as_deref().unwrap_or("info") };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let script = match cfg.script.as_ref() {
        Some(path) => Script::load(path).with_context(|| format!("loading script {}", path.display()))?,
        None => Script::parse(DEMO_SCRIPT).context("parsing built-in demo")?,
    };

    let display = cfg.display();
    let (width, height) = display.size();
    info!("{:?} panel {}x{}, {} events over {}ms", display.kind(), width, height, script.events.len(), script.duration_ms());

    match display.kind() {
        LcdKind::Graphical => {
            let mut lcd = GraphicalLcd::new(width, height)?;
            lcd.register_image(LOGO_IMAGE, width, logo_bitmap(width, height)?)?;
            play(&mut lcd, &cfg, &script, cli.realtime)?;
            print!("{}", lcd.to_ascii());
            if let Some(path) = cli.pbm.as_ref() {
                lcd.save_to_pbm(path).with_context(|| format!("writing {}", path.display()))?;
                info!("saved final frame to {}", path.display());
            }
        }
        LcdKind::Character => {
            let mut lcd = CharacterLcd::new(width, height)?;
            play(&mut lcd, &cfg, &script, cli.realtime)?;
            print!("{}", lcd.to_text());
            if cli.pbm.is_some() {
                warn!("--pbm ignored for character panels");
            }
        }
    }

    Ok(())
}

/// Step the panel one frame at a time until the script and its hold run out.
fn play<L: LcdSurface>(lcd: &mut L, cfg: &Config, script: &Script, realtime: bool) -> Result<()> {
    let display = cfg.display();
    let layout = display.meter_layout(MeterLayout::for_surface(&*lcd));
    let mut panel = FrontPanel::new(cfg.envelope_timings(), cfg.ui_timings(), layout, display.channels());

    let fps = display.fps() as u64;
    let duration_ms = script.duration_ms();
    let mut pacer = realtime.then(|| Pacer::new(display.fps()));
    if let Some(pacer) = pacer.as_ref() {
        info!("pacing at {:?} per frame", pacer.frame());
    }
    let mut player = script.player();

    let mut frame: u64 = 0;
    loop {
        let elapsed_ms = (frame * 1000 / fps) as u32;
        let now = millis_to_ticks(elapsed_ms);

        player.advance(elapsed_ms, &mut panel, lcd, now)?;
        panel.refresh(lcd, now)?;

        if elapsed_ms >= duration_ms && player.is_finished() {
            break;
        }
        if let Some(pacer) = pacer.as_mut() {
            pacer.wait();
        }
        frame += 1;
    }

    info!("played {} frames, final state {:?}", frame + 1, panel.ui.state());
    Ok(())
}

/// Boxed name plate, full panel size.
fn logo_bitmap(width: u32, height: u32) -> Result<Vec<u8>, DisplayError> {
    let mut fb = FrameBuffer::new(width, height, BinaryColor::Off);

    Rectangle::new(Point::zero(), Size::new(width, height))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(&mut fb)?;

    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let placement = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(
        env!("CARGO_PKG_NAME"),
        Point::new(width as i32 / 2, height as i32 / 2),
        style,
        placement,
    )
    .draw(&mut fb)?;

    Ok(fb.to_image_bytes())
}
