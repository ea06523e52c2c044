use crate::Error;
use png::{BitDepth, ColorType};

/// Mime type used in the data URI. The backend only stores PNG signatures.
const IMAGE_MIME_TYPE: &str = "image/png";

/// Header information of a signature image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    pub color_type: ColorType,
    pub bit_depth: BitDepth,
}

impl ImageInfo {
    /// Only the header is decoded, the image data is never inflated.
    pub fn read(image_data: &[u8]) -> Result<Self, Error> {
        let image_reader = png::Decoder::new(image_data).read_info()?;
        let info = image_reader.info();
        Ok(ImageInfo {
            width: info.width,
            height: info.height,
            color_type: info.color_type,
            bit_depth: info.bit_depth,
        })
    }

    /// Largest size with the image's aspect ratio that fits inside the box.
    pub fn fit_within(&self, max_width: f64, max_height: f64) -> (f64, f64) {
        if self.width == 0 || self.height == 0 {
            return (max_width, max_height);
        }
        let scale = (max_width / self.width as f64).min(max_height / self.height as f64);
        (self.width as f64 * scale, self.height as f64 * scale)
    }
}

/// Displayable form of a signature image.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// `data:image/png;base64,...`
    pub data_uri: String,
    /// `None` if the bytes are not a readable PNG.
    pub info: Option<ImageInfo>,
}

impl Thumbnail {
    pub fn from_image(image_data: &[u8]) -> Option<Self> {
        if image_data.is_empty() {
            return None;
        }
        let info = match ImageInfo::read(image_data) {
            Ok(info) => Some(info),
            Err(err) => {
                log::warn!("Signature image is not a readable PNG. Err: {}", err);
                None
            }
        };
        Some(Thumbnail {
            data_uri: format!(
                "data:{};base64,{}",
                IMAGE_MIME_TYPE,
                base64::encode(image_data)
            ),
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, width, height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&vec![0u8; (width * height * 4) as usize])
                .unwrap();
        }
        data
    }

    #[test]
    fn reads_png_header() {
        let thumbnail = Thumbnail::from_image(&png_bytes(40, 20)).unwrap();
        assert!(thumbnail.data_uri.starts_with("data:image/png;base64,iVBOR"));
        let info = thumbnail.info.unwrap();
        assert_eq!((info.width, info.height), (40, 20));
        assert_eq!(info.color_type, ColorType::Rgba);
        assert_eq!(info.fit_within(80.0, 40.0), (80.0, 40.0));
        assert_eq!(info.fit_within(20.0, 40.0), (20.0, 10.0));
    }

    #[test]
    fn non_png_still_has_data_uri() {
        let thumbnail = Thumbnail::from_image(&[1, 2, 3]).unwrap();
        assert_eq!(thumbnail.data_uri, "data:image/png;base64,AQID");
        assert_eq!(thumbnail.info, None);
    }

    #[test]
    fn empty_image_has_no_thumbnail() {
        assert_eq!(Thumbnail::from_image(&[]), None);
    }
}
