//! Variable-axis extraction (made by FontLab https://www.fontlab.com/)

use anyhow::Result;
use skrifa::{FontRef, MetadataProvider};

use crate::entry::{AxisData, AxisRange};
use crate::tags::{tag_to_string, tag_value};

/// Raw axis record as a face reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDescriptor {
    pub tag: u32,
    pub min: f32,
    pub max: f32,
}

/// A resolved face that may carry variation axes.
pub trait VariableFace {
    fn has_variations(&self) -> bool;

    /// Axis records in face order. Only called when `has_variations` is true.
    fn axis_descriptors(&self) -> Result<Vec<AxisDescriptor>>;
}

impl VariableFace for FontRef<'_> {
    fn has_variations(&self) -> bool {
        !self.axes().is_empty()
    }

    fn axis_descriptors(&self) -> Result<Vec<AxisDescriptor>> {
        Ok(self
            .axes()
            .iter()
            .map(|axis| AxisDescriptor {
                tag: tag_value(axis.tag()),
                min: axis.min_value(),
                max: axis.max_value(),
            })
            .collect())
    }
}

/// Read tags and ranges from a face.
///
/// Static faces and faces whose axis records cannot be read both produce
/// empty data; neither is an error for the caller.
pub fn extract(face: &dyn VariableFace) -> AxisData {
    if !face.has_variations() {
        return AxisData::default();
    }

    let descriptors = match face.axis_descriptors() {
        Ok(descriptors) => descriptors,
        Err(err) => {
            tracing::debug!(error = %err, "axis records unreadable");
            return AxisData::default();
        }
    };

    let mut data = AxisData::default();
    for axis in descriptors {
        let tag = tag_to_string(axis.tag);
        data.ranges.push(AxisRange {
            tag: tag.clone(),
            min: axis.min,
            max: axis.max,
        });
        data.tags.push(tag);
    }
    data
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;

    pub(crate) struct FakeFace {
        pub axes: Option<Vec<(&'static [u8; 4], f32, f32)>>,
    }

    impl VariableFace for FakeFace {
        fn has_variations(&self) -> bool {
            self.axes.is_some()
        }

        fn axis_descriptors(&self) -> Result<Vec<AxisDescriptor>> {
            let axes = self.axes.as_ref().ok_or_else(|| anyhow!("no fvar"))?;
            Ok(axes
                .iter()
                .map(|(tag, min, max)| AxisDescriptor {
                    tag: u32::from_be_bytes(**tag),
                    min: *min,
                    max: *max,
                })
                .collect())
        }
    }

    #[test]
    fn static_face_has_no_axes() {
        let data = extract(&FakeFace { axes: None });
        assert!(data.tags.is_empty());
        assert!(data.ranges.is_empty());
    }

    #[test]
    fn keeps_axis_order_and_ranges() {
        let face = FakeFace {
            axes: Some(vec![(b"wght", 100.0, 900.0), (b"wdth", 75.0, 100.0)]),
        };
        let data = extract(&face);

        assert_eq!(data.tags, vec!["wght".to_string(), "wdth".to_string()]);
        assert_eq!(
            data.ranges,
            vec![
                AxisRange {
                    tag: "wght".into(),
                    min: 100.0,
                    max: 900.0
                },
                AxisRange {
                    tag: "wdth".into(),
                    min: 75.0,
                    max: 100.0
                },
            ]
        );
    }

    #[test]
    fn unreadable_records_yield_empty_data() {
        struct Broken;
        impl VariableFace for Broken {
            fn has_variations(&self) -> bool {
                true
            }
            fn axis_descriptors(&self) -> Result<Vec<AxisDescriptor>> {
                Err(anyhow!("truncated fvar"))
            }
        }

        assert!(extract(&Broken).is_empty());
    }
}
