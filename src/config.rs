use anyhow::{Context, Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::geometry::{Rect, Size};
use crate::input;
use crate::pinch_zoom::ZoomConfig;
use crate::tap::TapConfig;
use crate::zoom::{PinchScaling, ZoomBoundaries, ZoomLimits};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub double_tap_ms: u64,
    pub double_tap_radius: f64,
    pub scale_epsilon: f64,
    pub border_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zoom {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub initially_zoom_to_viewport_width: bool,
    #[serde(default)]
    pub pinch_scaling: PinchScaling,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SceneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Page layout used by replay and live preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub viewport: SceneRect,
    pub content: Size,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    pub thresholds: Thresholds,
    pub zoom: Zoom,
    pub scene: Scene,
}

impl Profile {
    pub fn parse(txt: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn zoom_config(&self) -> ZoomConfig {
        ZoomConfig {
            initially_zoom_to_viewport_width: self.zoom.initially_zoom_to_viewport_width,
            limits: ZoomLimits {
                boundaries: ZoomBoundaries {
                    min: self.zoom.min,
                    max: self.zoom.max,
                },
                epsilon: self.thresholds.scale_epsilon,
                border_tolerance: self.thresholds.border_tolerance,
            },
            tap: TapConfig {
                window_ms: self.thresholds.double_tap_ms,
                radius: self.thresholds.double_tap_radius,
            },
            pinch_scaling: self.zoom.pinch_scaling,
        }
    }

    pub fn viewport_rect(&self) -> Rect {
        let v = self.scene.viewport;
        Rect::new(v.x, v.y, v.x + v.width, v.y + v.height)
    }
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("pinchzoom"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ProfileStore {
    pub fn load_or_install_default() -> Result<Self> {
        Self::open_at(config_dir()?)
    }

    /// Opens (and seeds, when empty) the profile store rooted at `cfgdir`.
    pub fn open_at(cfgdir: PathBuf) -> Result<Self> {
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)
            .with_context(|| format!("failed to create {}", profdir.display()))?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            fs::write(&active_ptr, b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = load_profile(&profdir, &active_name)?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profile_path(name);
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        // validate before switching the pointer
        let profile = load_profile(&self.profiles_dir, name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = profile;
        Ok(())
    }

    /// The named profile, or the active one.
    pub fn resolve(&self, name: Option<&str>) -> Result<Profile> {
        match name {
            Some(n) if n != self.active_name => load_profile(&self.profiles_dir, n),
            _ => Ok(self.profile.clone()),
        }
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        let devices: Vec<String> = input::discover_multitouch()
            .into_iter()
            .map(|d| format!("{} ({})", d.name, d.path))
            .collect();
        serde_json::json!({
            "input_group_member": check_in_input_group(),
            "config_dir": self.config_dir,
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "devices": devices,
            "hints": {
                "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
            }
        })
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }
}

fn load_profile(dir: &Path, name: &str) -> Result<Profile> {
    let path = dir.join(format!("{name}.toml"));
    let txt = fs::read_to_string(&path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    Profile::parse(&txt).map_err(|e| anyhow!("failed to load {}: {e}", path.display()))
}

fn validate_profile(p: &Profile) -> Result<()> {
    let th = &p.thresholds;
    if th.double_tap_ms == 0 {
        return Err(anyhow!("thresholds.double_tap_ms must be a positive duration"));
    }
    if !(th.double_tap_radius > 0.0) {
        return Err(anyhow!("thresholds.double_tap_radius must be positive"));
    }
    if !(th.scale_epsilon > 0.0 && th.scale_epsilon < 0.5) {
        return Err(anyhow!("thresholds.scale_epsilon must be in (0, 0.5)"));
    }
    if !(th.border_tolerance >= 0.0) {
        return Err(anyhow!("thresholds.border_tolerance must not be negative"));
    }

    let z = &p.zoom;
    if !(z.min > 0.0 && z.min < z.max) {
        return Err(anyhow!("zoom.min must be positive and below zoom.max"));
    }
    if z.max < 1.0 + th.scale_epsilon {
        return Err(anyhow!(
            "zoom.max must be at least 1 + scale_epsilon ({})",
            1.0 + th.scale_epsilon
        ));
    }

    let s = &p.scene;
    if !(s.viewport.width > 0.0 && s.viewport.height > 0.0) {
        return Err(anyhow!("scene.viewport must have a positive size"));
    }
    if !(s.content.width > 0.0 && s.content.height > 0.0) {
        return Err(anyhow!("scene.content must have a positive size"));
    }
    Ok(())
}

fn check_in_input_group() -> bool {
    if let Ok(s) = fs::read_to_string("/etc/group") {
        let user = whoami::username();
        for line in s.lines() {
            if line.starts_with("input:")
                && line
                    .split(':')
                    .nth(3)
                    .unwrap_or("")
                    .split(',')
                    .any(|u| u == user)
            {
                return true;
            }
        }
    }
    false
}
