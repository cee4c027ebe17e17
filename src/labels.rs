use image::Rgb;

/// Number of Pascal VOC segmentation classes, including background.
pub const NUM_CLASSES: usize = 21;

/// The Pascal VOC label/color table.
///
/// The class index predicted by a model is the position in this array; index 0
/// is always "background". Every backend's post-processing maps through this
/// single table so that all variants colorize identically.
pub const LABEL_COLORS: [(&str, Rgb<u8>); NUM_CLASSES] = [
    ("background", Rgb([0, 0, 0])),
    ("aeroplane", Rgb([128, 0, 0])),
    ("bicycle", Rgb([0, 128, 0])),
    ("bird", Rgb([128, 128, 0])),
    ("boat", Rgb([0, 0, 128])),
    ("bottle", Rgb([128, 0, 128])),
    ("bus", Rgb([0, 128, 128])),
    ("car", Rgb([128, 128, 128])),
    ("cat", Rgb([64, 0, 0])),
    ("chair", Rgb([192, 0, 0])),
    ("cow", Rgb([64, 128, 0])),
    ("diningtable", Rgb([192, 128, 0])),
    ("dog", Rgb([64, 0, 128])),
    ("horse", Rgb([192, 0, 128])),
    ("motorbike", Rgb([64, 128, 128])),
    ("person", Rgb([192, 128, 128])),
    ("pottedplant", Rgb([0, 64, 0])),
    ("sheep", Rgb([128, 64, 0])),
    ("sofa", Rgb([0, 192, 0])),
    ("train", Rgb([128, 192, 0])),
    ("tv", Rgb([0, 64, 128])),
];

/// Display color for a class index.
pub const fn color_of(class_id: usize) -> Rgb<u8> {
    LABEL_COLORS[class_id].1
}

/// Label name for a class index.
pub const fn name_of(class_id: usize) -> &'static str {
    LABEL_COLORS[class_id].0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size_and_background() {
        assert_eq!(LABEL_COLORS.len(), 21);
        assert_eq!(LABEL_COLORS[0].0, "background");
        assert_eq!(LABEL_COLORS[0].1, Rgb([0, 0, 0]));
    }

    #[test]
    fn test_lookup_helpers() {
        assert_eq!(name_of(15), "person");
        assert_eq!(color_of(15), Rgb([192, 128, 128]));
        assert_eq!(name_of(20), "tv");
        assert_eq!(color_of(20), Rgb([0, 64, 128]));
    }

    #[test]
    fn test_colors_are_unique() {
        for (i, (_, a)) in LABEL_COLORS.iter().enumerate() {
            for (_, b) in LABEL_COLORS.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
