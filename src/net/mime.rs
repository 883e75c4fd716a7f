use std::ffi::OsStr;
use std::collections::HashMap;

use mime::Mime;
use lazy_static::lazy_static;

lazy_static! {
    static ref EXT_MIME_MAP: HashMap<&'static OsStr, Mime> = {
        let mut m = HashMap::new();
        // image mime types
        m.insert(OsStr::new("jpg"), mime::IMAGE_JPEG);
        m.insert(OsStr::new("jpeg"), mime::IMAGE_JPEG);
        m.insert(OsStr::new("png"), mime::IMAGE_PNG);
        m.insert(OsStr::new("gif"), mime::IMAGE_GIF);
        m.insert(OsStr::new("svg"), mime::IMAGE_SVG);
        m.insert(OsStr::new("bmp"), mime::IMAGE_BMP);

        // text mime types
        m.insert(OsStr::new("css"), mime::TEXT_CSS);
        m.insert(OsStr::new("html"), mime::TEXT_HTML);
        m.insert(OsStr::new("txt"), mime::TEXT_PLAIN);
        m.insert(OsStr::new("csv"), mime::TEXT_CSV);

        // application mime types
        m.insert(OsStr::new("js"), mime::APPLICATION_JAVASCRIPT);
        m.insert(OsStr::new("json"), mime::APPLICATION_JSON);
        m.insert(OsStr::new("pdf"), mime::APPLICATION_PDF);
        m.insert(OsStr::new("woff"), mime::FONT_WOFF);
        m.insert(OsStr::new("woff2"), mime::FONT_WOFF2);
        m
    };
}

pub fn mime_from_ext(ext: Option<&OsStr>) -> Mime {
    ext.and_then(|ext| EXT_MIME_MAP.get(ext))
        .cloned()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(mime_from_ext(Some(OsStr::new("css"))), mime::TEXT_CSS);
        assert_eq!(mime_from_ext(Some(OsStr::new("pdf"))), mime::APPLICATION_PDF);
        assert_eq!(mime_from_ext(Some(OsStr::new("unknown"))), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(mime_from_ext(None), mime::APPLICATION_OCTET_STREAM);
    }
}
