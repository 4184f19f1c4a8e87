/// Recording layout commands understood by the remote compositor
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::message::Reaction;

/// Layout sent with start-recording and update-recording commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingLayout {
    pub preset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_assets: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition_params: Option<CompositionParams>,
}

/// Overlay parameters; keys use the compositor's dotted naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompositionParams {
    Text(TextOverlay),
    Image(ImageOverlay),
    ClearImage(ClearImageOverlay),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    #[serde(rename = "showTextOverlay")]
    pub show_text_overlay: bool,
    #[serde(rename = "text.align_horizontal")]
    pub align_horizontal: String,
    #[serde(rename = "text.align_vertical")]
    pub align_vertical: String,
    #[serde(rename = "text.offset_x_gu")]
    pub offset_x_gu: f32,
    #[serde(rename = "text.offset_y_gu")]
    pub offset_y_gu: f32,
    #[serde(rename = "text.fontSize_gu")]
    pub font_size_gu: f32,
    #[serde(rename = "text.fontFamily")]
    pub font_family: String,
    #[serde(rename = "text.color")]
    pub color: String,
    #[serde(rename = "videoSettings.showParticipantLabels")]
    pub show_participant_labels: bool,
    #[serde(rename = "text.content")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOverlay {
    #[serde(rename = "showImageOverlay")]
    pub show_image_overlay: bool,
    #[serde(rename = "image.position")]
    pub position: String,
    #[serde(rename = "image.enableFade")]
    pub enable_fade: bool,
    #[serde(rename = "image.assetName")]
    pub asset_name: String,
    #[serde(rename = "image.opacity")]
    pub opacity: f32,
    #[serde(rename = "image.height_gu")]
    pub height_gu: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearImageOverlay {
    #[serde(rename = "showImageOverlay")]
    pub show_image_overlay: bool,
}

/// Separator between chat lines in the text overlay
pub const LINE_SEPARATOR: &str = "\r\n";

impl RecordingLayout {
    /// Layout for starting a recording, binding the reaction artwork
    pub fn with_reaction_assets(preset: &str, asset_base_url: &str) -> Self {
        let base = asset_base_url.trim_end_matches('/');
        let session_assets = Reaction::ALL
            .iter()
            .map(|r| (r.asset_key(), format!("{}/{}.png", base, r.asset_name())))
            .collect();

        Self {
            preset: preset.to_string(),
            session_assets: Some(session_assets),
            composition_params: None,
        }
    }

    /// Text overlay listing `lines`, newest last, anchored bottom-right
    pub fn chat_text<S: AsRef<str>>(preset: &str, lines: &[S]) -> Self {
        let content = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR);

        Self {
            preset: preset.to_string(),
            session_assets: None,
            composition_params: Some(CompositionParams::Text(TextOverlay {
                show_text_overlay: true,
                align_horizontal: "right".to_string(),
                align_vertical: "bottom".to_string(),
                offset_x_gu: -1.0,
                offset_y_gu: 0.5,
                font_size_gu: 1.0,
                font_family: "Exo".to_string(),
                color: "rgba(255, 255, 255, 0.95)".to_string(),
                show_participant_labels: false,
                content,
            })),
        }
    }

    /// Image overlay showing `reaction` in the top-left corner
    pub fn reaction_image(preset: &str, reaction: Reaction, opacity: f32, height_gu: u32) -> Self {
        Self {
            preset: preset.to_string(),
            session_assets: None,
            composition_params: Some(CompositionParams::Image(ImageOverlay {
                show_image_overlay: true,
                position: "top-left".to_string(),
                enable_fade: true,
                asset_name: reaction.asset_name().to_string(),
                opacity,
                height_gu,
            })),
        }
    }

    pub fn clear_reaction(preset: &str) -> Self {
        Self {
            preset: preset.to_string(),
            session_assets: None,
            composition_params: Some(CompositionParams::ClearImage(ClearImageOverlay {
                show_image_overlay: false,
            })),
        }
    }

    /// Text content if this is a text overlay
    pub fn text_content(&self) -> Option<&str> {
        match &self.composition_params {
            Some(CompositionParams::Text(text)) => Some(&text.content),
            _ => None,
        }
    }

    pub fn is_clear_reaction(&self) -> bool {
        matches!(
            self.composition_params,
            Some(CompositionParams::ClearImage(ClearImageOverlay {
                show_image_overlay: false
            }))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_layout_binds_four_assets() {
        let layout = RecordingLayout::with_reaction_assets("custom", "https://cdn.example.com/assets/");
        let assets = layout.session_assets.as_ref().unwrap();

        assert_eq!(assets.len(), 4);
        assert_eq!(assets["images/up"], "https://cdn.example.com/assets/up.png");
        assert_eq!(assets["images/down"], "https://cdn.example.com/assets/down.png");
        assert_eq!(assets["images/heart"], "https://cdn.example.com/assets/heart.png");
        assert_eq!(assets["images/boo"], "https://cdn.example.com/assets/boo.png");

        let value = serde_json::to_value(&layout).unwrap();
        assert!(value.get("composition_params").is_none());
    }

    #[test]
    fn test_text_overlay_wire_shape() {
        let layout = RecordingLayout::chat_text("custom", &["Alice: hi", "Bob: yo"]);
        let value = serde_json::to_value(&layout).unwrap();
        let params = &value["composition_params"];

        assert_eq!(value["preset"], "custom");
        assert_eq!(params["showTextOverlay"], true);
        assert_eq!(params["text.align_horizontal"], "right");
        assert_eq!(params["text.align_vertical"], "bottom");
        assert_eq!(params["text.offset_x_gu"], -1.0);
        assert_eq!(params["text.fontFamily"], "Exo");
        assert_eq!(params["text.content"], "Alice: hi\r\nBob: yo");
    }

    #[test]
    fn test_image_and_clear_wire_shape() {
        let layout = RecordingLayout::reaction_image("custom", Reaction::Heart, 0.5, 3);
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["composition_params"]["image.assetName"], "heart");
        assert_eq!(value["composition_params"]["image.position"], "top-left");
        assert_eq!(value["composition_params"]["image.height_gu"], 3);

        let clear = RecordingLayout::clear_reaction("custom");
        assert!(clear.is_clear_reaction());
        assert_eq!(
            serde_json::to_value(&clear).unwrap(),
            json!({ "preset": "custom", "composition_params": { "showImageOverlay": false } })
        );
    }

    #[test]
    fn test_text_generation_is_deterministic() {
        let lines = vec!["A: 1".to_string(), "B: 2".to_string()];
        assert_eq!(
            RecordingLayout::chat_text("custom", &lines),
            RecordingLayout::chat_text("custom", &lines)
        );
    }
}
