//! Scripted interactions
//!
//! A script is a JSON document listing host-side inputs in order: layout
//! changes, content measurements, drags, taps, and commands. The runner
//! feeds them to a headless sheet at a fixed frame rate and writes one JSON
//! line per frame.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use glide_sheet::{
    ContainerLayout, ContentRegion, GestureEvent, ScrollLockMode, SheetCommand, SheetConfig,
    SheetController, SheetEvent,
};

/// Upper bound on frames spent waiting for a sheet to come to rest
const MAX_SETTLE_FRAMES: u32 = 10_000;

#[derive(Debug, Deserialize)]
pub struct Script {
    /// Container to mount into; the CLI's `--height` applies otherwise
    #[serde(default)]
    pub container: Option<ContainerLayout>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Re-measure the container
    Layout { height: f32 },
    /// Report a content region's measured height
    Content { region: String, height: f32 },
    /// Drag from the current position to `to`, then release
    Drag {
        to: f32,
        #[serde(default = "default_drag_ms")]
        duration_ms: f32,
        /// Release velocity; estimated from the drag when omitted
        #[serde(default)]
        velocity: Option<f32>,
        /// Cancel instead of releasing
        #[serde(default)]
        cancel: bool,
    },
    Command { command: ScriptCommand },
    /// Tap the backdrop
    Tap,
    /// Advance the clock
    Wait { ms: f32 },
    /// Advance until the sheet is at rest
    Settle,
}

fn default_drag_ms() -> f32 {
    150.0
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCommand {
    SnapToIndex(i32),
    SnapToPosition(f32),
    Expand,
    Collapse,
    Close,
}

impl From<ScriptCommand> for SheetCommand {
    fn from(command: ScriptCommand) -> Self {
        match command {
            ScriptCommand::SnapToIndex(index) => SheetCommand::SnapToIndex(index),
            ScriptCommand::SnapToPosition(position) => SheetCommand::SnapToPosition(position),
            ScriptCommand::Expand => SheetCommand::Expand,
            ScriptCommand::Collapse => SheetCommand::Collapse,
            ScriptCommand::Close => SheetCommand::Close,
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(source)?;
        for step in &script.steps {
            if let Step::Content { region, .. } = step {
                region.parse::<ContentRegion>()?;
            }
        }
        Ok(script)
    }
}

/// One output line
#[derive(Debug, Serialize, PartialEq)]
pub struct FrameRecord {
    pub frame: u32,
    pub time_ms: f64,
    pub position: f32,
    pub index: f32,
    pub current_index: i32,
    pub gesture_active: bool,
    pub scroll_lock: ScrollLockMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

pub struct Runner {
    sheet: SheetController,
    events: Arc<Mutex<Vec<SheetEvent>>>,
    dt: f32,
    frame: u32,
    time_ms: f64,
}

impl Runner {
    pub fn new(config: SheetConfig, layout: ContainerLayout, fps: u32) -> Result<Self> {
        let sheet = SheetController::new("simulate", config)?;
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        sheet.subscribe(move |event| {
            if let Ok(mut events) = sink.lock() {
                events.push(*event);
            }
        });
        sheet.set_layout(layout);

        Ok(Self {
            sheet,
            events,
            dt: 1.0 / fps.max(1) as f32,
            frame: 0,
            time_ms: 0.0,
        })
    }

    pub fn sheet(&self) -> &SheetController {
        &self.sheet
    }

    pub fn frames(&self) -> u32 {
        self.frame
    }

    pub fn run(&mut self, script: &Script, out: &mut impl Write) -> Result<()> {
        // Mount settle
        self.settle(out)?;
        for (n, step) in script.steps.iter().enumerate() {
            tracing::debug!("step {}: {:?}", n, step);
            self.step(step, out)
                .with_context(|| format!("step {} failed", n))?;
        }
        Ok(())
    }

    fn step(&mut self, step: &Step, out: &mut impl Write) -> Result<()> {
        match step {
            Step::Layout { height } => {
                self.sheet.set_layout(ContainerLayout::new(*height));
                self.emit(out)
            }
            Step::Content { region, height } => {
                let region: ContentRegion = region.parse()?;
                let report = self.sheet.report_content_height(region, *height);
                tracing::debug!("{} height {} -> {:?}", region, height, report.is_accepted());
                self.emit(out)
            }
            Step::Drag {
                to,
                duration_ms,
                velocity,
                cancel,
            } => self.drag(*to, *duration_ms, *velocity, *cancel, out),
            Step::Command { command } => {
                self.sheet.command((*command).into());
                self.emit(out)
            }
            Step::Tap => {
                if self.sheet.press_backdrop().is_none() {
                    tracing::info!("backdrop tap ignored at frame {}", self.frame);
                }
                self.emit(out)
            }
            Step::Wait { ms } => {
                let frames = (ms / (self.dt * 1000.0)).round().max(0.0) as u32;
                for _ in 0..frames {
                    self.advance(out)?;
                }
                Ok(())
            }
            Step::Settle => self.settle(out),
        }
    }

    fn drag(
        &mut self,
        to: f32,
        duration_ms: f32,
        velocity: Option<f32>,
        cancel: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let from = self.sheet.snapshot().position;
        let translation = to - from;
        let frames = (duration_ms / (self.dt * 1000.0)).round().max(1.0) as u32;

        self.sheet.handle_gesture(GestureEvent::Begin {
            timestamp_ms: self.time_ms,
        });
        for step in 1..=frames {
            let t = step as f32 / frames as f32;
            self.sheet.handle_gesture(GestureEvent::Update {
                translation_y: translation * t,
                velocity_y: None,
                timestamp_ms: self.time_ms + (self.dt * 1000.0) as f64,
            });
            self.advance(out)?;
        }

        let release = if cancel {
            GestureEvent::Cancel
        } else {
            GestureEvent::End {
                translation_y: translation,
                velocity_y: velocity,
                timestamp_ms: self.time_ms,
            }
        };
        self.sheet.handle_gesture(release);
        self.emit(out)
    }

    fn settle(&mut self, out: &mut impl Write) -> Result<()> {
        for _ in 0..MAX_SETTLE_FRAMES {
            if !self.advance(out)? {
                return Ok(());
            }
        }
        anyhow::bail!("sheet still moving after {} frames", MAX_SETTLE_FRAMES)
    }

    /// Tick one frame and write it; returns whether the sheet is still moving
    fn advance(&mut self, out: &mut impl Write) -> Result<bool> {
        let moving = self.sheet.tick(self.dt);
        self.frame += 1;
        self.time_ms += (self.dt * 1000.0) as f64;
        self.emit(out)?;
        Ok(moving)
    }

    fn record(&self) -> FrameRecord {
        let frame = self.sheet.frame();
        let events = match self.events.lock() {
            Ok(mut events) => events.drain(..).map(|e| format!("{:?}", e)).collect(),
            Err(_) => Vec::new(),
        };
        FrameRecord {
            frame: self.frame,
            time_ms: self.time_ms,
            position: frame.motion.position,
            index: frame.motion.index,
            current_index: frame.motion.current_index,
            gesture_active: frame.motion.gesture_active,
            scroll_lock: frame.scroll.mode,
            backdrop_opacity: frame.backdrop.map(|b| b.opacity),
            events,
        }
    }

    fn emit(&self, out: &mut impl Write) -> Result<()> {
        let line = serde_json::to_string(&self.record())?;
        writeln!(out, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_sheet::SnapPoint;

    fn config() -> SheetConfig {
        SheetConfig::new([
            SnapPoint::Percent(25.0),
            SnapPoint::Percent(50.0),
            SnapPoint::Percent(90.0),
        ])
    }

    fn run(config: SheetConfig, source: &str) -> (Runner, Vec<serde_json::Value>) {
        let script = Script::parse(source).unwrap();
        let mut runner = Runner::new(config, ContainerLayout::new(800.0), 60).unwrap();
        let mut out = Vec::new();
        runner.run(&script, &mut out).unwrap();
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (runner, lines)
    }

    #[test]
    fn test_parse_all_steps() {
        let script = Script::parse(
            r#"{
                "container": { "height": 640 },
                "steps": [
                    { "op": "layout", "height": 700 },
                    { "op": "content", "region": "body", "height": 300 },
                    { "op": "drag", "to": 120, "velocity": -900 },
                    { "op": "drag", "to": 500, "cancel": true },
                    { "op": "command", "command": { "snap_to_index": 1 } },
                    { "op": "command", "command": "close" },
                    { "op": "tap" },
                    { "op": "wait", "ms": 100 },
                    { "op": "settle" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.container.unwrap().height, 640.0);
        assert_eq!(script.steps.len(), 9);
        assert!(matches!(
            script.steps[2],
            Step::Drag { duration_ms, velocity: Some(v), cancel: false, .. }
                if duration_ms == 150.0 && v == -900.0
        ));
        assert!(matches!(
            script.steps[4],
            Step::Command { command: ScriptCommand::SnapToIndex(1) }
        ));
    }

    #[test]
    fn test_unknown_region_rejected() {
        let err = Script::parse(
            r#"{ "steps": [ { "op": "content", "region": "header", "height": 10 } ] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn test_expand_then_settle() {
        let (runner, lines) = run(
            config(),
            r#"{ "steps": [
                { "op": "command", "command": "expand" },
                { "op": "settle" }
            ] }"#,
        );

        assert_eq!(runner.sheet().snapshot().current_index, 2);
        let last = lines.last().unwrap();
        assert_eq!(last["position"], 80.0);
        assert_eq!(last["scroll_lock"], "unlocked");
        assert!(lines
            .iter()
            .any(|line| line["events"].to_string().contains("IndexCommitted")));
    }

    #[test]
    fn test_slow_drag_snaps_to_nearest() {
        let (runner, _) = run(
            config(),
            r#"{ "steps": [
                { "op": "drag", "to": 320, "duration_ms": 400, "velocity": 5 },
                { "op": "settle" }
            ] }"#,
        );

        let snapshot = runner.sheet().snapshot();
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.position, 400.0);
    }

    #[test]
    fn test_wait_advances_frames() {
        let (runner, lines) = run(config(), r#"{ "steps": [ { "op": "wait", "ms": 500 } ] }"#);
        assert!(runner.frames() >= 30);
        assert_eq!(lines.len() as u32, runner.frames());
        assert_eq!(lines.last().unwrap()["frame"], runner.frames());
    }
}
