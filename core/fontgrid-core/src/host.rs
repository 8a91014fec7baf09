//! Host editor integration (made by FontLab https://www.fontlab.com/)
//!
//! The host exposes its timeline through an edit section that is only valid
//! inside [`HostEditor::call_edit_section`]. Everything here reports failure
//! as `false` after logging; nothing is retried.

use crate::alias::{self, AliasFields, TemplateId, FALLBACK_FRAMES};
use crate::entry::FontEntry;

pub const VARIABLE_FONT_EFFECT: &str = "Variable Font Text";
pub const TEXT_EFFECT: &str = "テキスト";
pub const FONT_ITEM: &str = "フォント";
pub const FONT_FILE_ITEM: &str = "フォントファイル";

/// Opaque object reference handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Timeline time base and cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditInfo {
    pub rate: i32,
    pub scale: i32,
    pub layer: i32,
    pub frame: i32,
}

/// The host's edit context while a callback runs.
pub trait EditSection {
    fn info(&self) -> Option<EditInfo>;

    fn selected_objects(&self) -> Vec<ObjectHandle>;

    fn focus_object(&self) -> Option<ObjectHandle>;

    /// Write `value` into `effect`/`item` of `object`.
    fn set_object_item_value(
        &mut self,
        object: ObjectHandle,
        effect: &str,
        item: &str,
        value: &str,
    ) -> bool;

    fn create_object_from_alias(
        &mut self,
        alias: &str,
        layer: i32,
        frame: i32,
        flags: u32,
    ) -> Option<ObjectHandle>;
}

/// Entry point into the host.
pub trait HostEditor {
    fn edit_info(&self) -> Option<EditInfo>;

    /// Run `callback` synchronously against the edit context; `false` when the host refused.
    fn call_edit_section(&self, callback: &mut dyn FnMut(&mut dyn EditSection)) -> bool;
}

/// Alias length for the host's current time base.
pub fn alias_frames(host: &dyn HostEditor, seconds: f64) -> u32 {
    let Some(info) = host.edit_info() else {
        return FALLBACK_FRAMES;
    };
    let frames = alias::frame_length_or_fallback(seconds, info.rate, info.scale);
    tracing::trace!(seconds, rate = info.rate, scale = info.scale, frames, "alias length");
    frames
}

/// Instantiate an object from `template` at the current layer and frame.
pub fn create_object_from_alias(
    host: &dyn HostEditor,
    template: TemplateId,
    entry: &FontEntry,
    sample_text: &str,
    seconds: f64,
) -> bool {
    let frames = alias_frames(host, seconds);
    let text = match alias::render_alias(
        template,
        &AliasFields {
            entry,
            sample_text,
            frame_length: i64::from(frames),
        },
    ) {
        Ok(text) => text,
        Err(err) => {
            tracing::error!(error = %err, "alias template rejected");
            return false;
        }
    };

    let mut created = false;
    let called = host.call_edit_section(&mut |edit| {
        let (layer, frame) = edit.info().map(|i| (i.layer, i.frame)).unwrap_or((0, 0));
        created = edit.create_object_from_alias(&text, layer, frame, 0).is_some();
    });

    let ok = called && created;
    if ok {
        tracing::info!(template = template.name(), font = entry.display_name(), "object created");
    } else {
        tracing::error!(template = template.name(), called, "create_object_from_alias failed");
    }
    ok
}

/// Point the selected objects (or the focused one) at `entry`.
///
/// Succeeds when the host ran the callback and at least one object took a write.
pub fn apply_font_to_objects(host: &dyn HostEditor, entry: &FontEntry) -> bool {
    tracing::info!(
        name = entry.display_name(),
        system = entry.is_system_font(),
        path = %entry.file_path().display(),
        "applying font to host objects"
    );
    let path = entry.file_path().to_string_lossy();

    let mut updated = false;
    let called = host.call_edit_section(&mut |edit| {
        let selected = edit.selected_objects();
        updated = if selected.is_empty() {
            edit.focus_object()
                .is_some_and(|object| write_font(edit, object, entry, &path))
        } else {
            let mut count = 0;
            for object in selected {
                count += usize::from(write_font(edit, object, entry, &path));
            }
            count > 0
        };
    });

    if !called {
        tracing::warn!("host refused the edit section call");
    }
    called && updated
}

fn write_font(edit: &mut dyn EditSection, object: ObjectHandle, entry: &FontEntry, path: &str) -> bool {
    let writes = if entry.is_system_font() {
        let name = entry.display_name();
        vec![
            (TEXT_EFFECT, FONT_ITEM, name),
            (VARIABLE_FONT_EFFECT, FONT_ITEM, name),
            (VARIABLE_FONT_EFFECT, FONT_FILE_ITEM, ""),
        ]
    } else {
        vec![
            (VARIABLE_FONT_EFFECT, FONT_ITEM, ""),
            (VARIABLE_FONT_EFFECT, FONT_FILE_ITEM, path),
        ]
    };

    let mut ok = false;
    for (effect, item, value) in writes {
        // every write is attempted even after one succeeds
        ok |= edit.set_object_item_value(object, effect, item, value);
    }
    ok
}
