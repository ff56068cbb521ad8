use crate::envelope::Envelope;
use crate::scanner::Scanner;
use cmb_domain::config::ScannerConfig;
use tracing::{info, warn};

impl Scanner {
    /// Pushes a reader profile to a connected reader, one command at a time and in order.
    ///
    /// Camera-only settings (camera mode, preview, duplicates timeout) are skipped for MX
    /// readers. Symbologies in `disable` are applied after `enable`, so a symbology listed in
    /// both ends up disabled. Returns every settled envelope; a failure does not stop the rest.
    pub async fn apply_profile(&self, config: &ScannerConfig) -> Vec<Envelope> {
        let mut applied = Vec::new();

        if config.device.is_camera() {
            applied.push(self.set_camera_mode(config.camera_mode).await);
            applied.push(self.set_preview_options(config.preview.options).await);
            applied.push(self.set_preview_overlay_mode(config.preview.overlay).await);
            if config.preview.full_screen {
                applied.push(self.set_preview_container_full_screen().await);
            } else if let Some(rect) = config.preview.rect {
                applied.push(self.set_preview_container_position_and_size(rect).await);
            }
            if config.preview.below_status_bar {
                applied.push(self.set_preview_container_below_status_bar(true).await);
            }
            if let Some(seconds) = config.results.duplicates_timeout_secs {
                applied.push(self.set_camera_duplicates_timeout(seconds).await);
            }
            applied.push(self.set_stop_scanner_on_rotate(config.results.stop_on_rotate).await);
        }

        applied.push(self.set_parser(config.parser).await);
        applied.push(self.enable_image(config.results.image).await);
        applied.push(self.enable_image_graphics(config.results.image_graphics).await);

        for &symbology in &config.symbologies.enable {
            applied.push(self.set_symbology_enabled(symbology, true).await);
        }
        for &symbology in &config.symbologies.disable {
            applied.push(self.set_symbology_enabled(symbology, false).await);
        }

        if let Some(trigger) = config.trigger {
            applied.push(self.set_trigger_type(trigger).await);
        }

        let failed = applied.iter().filter(|e| !e.status).count();
        if failed == 0 {
            info!(commands = applied.len(), device = config.device.friendly_name(), "Reader profile applied");
        } else {
            warn!(commands = applied.len(), failed, device = config.device.friendly_name(), "Reader profile partially applied");
        }
        applied
    }
}
