//! Test fixtures for creating sample data
//!
//! This module builds real `.ipa` archives and encoded images in memory, plus
//! upstream release records, so tests exercise the same decoding paths as
//! production.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

use crate::upstream::{UpstreamAsset, UpstreamRelease};

/// XML `Info.plist` with the three fields the catalog reads.
pub fn info_plist(version: &str, build: &str, identifier: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>{identifier}</string>
    <key>CFBundleShortVersionString</key>
    <string>{version}</string>
    <key>CFBundleVersion</key>
    <string>{build}</string>
</dict>
</plist>
"#
    )
}

/// A minimal `.ipa`: an app extension manifest (which must be ignored)
/// followed by the app's own `Info.plist`.
pub fn build_ipa(app_name: &str, version: &str, build: &str, identifier: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer
        .start_file(format!("Payload/{app_name}.app/PlugIns/Widget.appex/Info.plist"), options)
        .unwrap();
    writer.write_all(info_plist("9.9.9", "999", "com.example.widget").as_bytes()).unwrap();

    writer.start_file(format!("Payload/{app_name}.app/Info.plist"), options).unwrap();
    writer.write_all(info_plist(version, build, identifier).as_bytes()).unwrap();

    writer.start_file(format!("Payload/{app_name}.app/{app_name}"), options).unwrap();
    writer.write_all(b"\xCF\xFA\xED\xFE binary").unwrap();

    writer.finish().unwrap().into_inner()
}

/// A zip archive without any app manifest.
pub fn build_archive_without_manifest() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("README.txt", SimpleFileOptions::default()).unwrap();
    writer.write_all(b"nothing to see").unwrap();
    writer.finish().unwrap().into_inner()
}

/// A PNG of the given size filled with one colour.
pub fn build_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// An asset whose download URL is derived from its name.
pub fn asset(file_name: &str, size_bytes: u64) -> UpstreamAsset {
    UpstreamAsset {
        file_name: file_name.to_string(),
        download_url: format!("https://github.com/downloads/{file_name}"),
        size_bytes,
    }
}

/// A published release. `date` is `YYYY-MM-DD`.
pub fn release(tag: &str, pre_release: bool, date: &str, assets: Vec<UpstreamAsset>) -> UpstreamRelease {
    UpstreamRelease {
        tag: tag.to_string(),
        is_draft: false,
        is_pre_release: pre_release,
        published_at: Some(format!("{date}T12:00:00Z")),
        body: Some(format!("Changes in {tag}")),
        assets,
    }
}
