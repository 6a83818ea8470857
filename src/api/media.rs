//! Media uploads.
//!
//! Attachments are uploaded first and referenced from a [`crate::api::Toot`] by id. The
//! upload is a multipart POST; the content type of a local file is sniffed from its first
//! 512 bytes.

use std::path::Path;

use mime::Mime;
use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::api::client::Client;
use crate::api::types::{Attachment, Focus};
use crate::context::Context;
use crate::error::Result;

const SNIFF_LEN: usize = 512;

/// Leading signature, its offset and the content type it identifies.
const MAGIC: &[(&[u8], usize, &str)] = &[
    (b"\x89PNG\r\n\x1a\n", 0, "image/png"),
    (b"\xff\xd8\xff", 0, "image/jpeg"),
    (b"GIF87a", 0, "image/gif"),
    (b"GIF89a", 0, "image/gif"),
    (b"WEBP", 8, "image/webp"),
    (b"WAVE", 8, "audio/wave"),
    (b"AVI ", 8, "video/avi"),
    (b"ftyp", 4, "video/mp4"),
    (b"\x1a\x45\xdf\xa3", 0, "video/webm"),
    (b"OggS\x00", 0, "application/ogg"),
    (b"ID3", 0, "audio/mpeg"),
    (b"fLaC", 0, "audio/flac"),
    (b"BM", 0, "image/bmp"),
];

/// An attachment ready to upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Media {
    pub data: Vec<u8>,
    pub file_name: String,
    /// Alt text.
    pub description: Option<String>,
    /// Focal point, each axis in -1.0..=1.0.
    pub focus: Option<Focus>,
}

impl Media {
    pub fn new(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_focus(mut self, x: f64, y: f64) -> Self {
        self.focus = Some(Focus { x, y });
        self
    }

    fn into_form(self) -> Result<Form> {
        let mime = sniff(&self.data);
        let part = Part::bytes(self.data)
            .file_name(self.file_name)
            .mime_str(mime.as_ref())?;
        let mut form = Form::new().part("file", part);
        if let Some(description) = self.description.filter(|d| !d.is_empty()) {
            form = form.text("description", description);
        }
        if let Some(focus) = self.focus {
            form = form.text("focus", format!("{},{}", focus.x, focus.y));
        }
        Ok(form)
    }
}

/// Content type from leading magic bytes; text if it looks like UTF-8, else octet-stream.
pub fn sniff(data: &[u8]) -> Mime {
    let head = &data[..data.len().min(SNIFF_LEN)];
    for &(magic, offset, kind) in MAGIC {
        if head.len() >= offset + magic.len() && &head[offset..offset + magic.len()] == magic {
            return kind.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM);
        }
    }
    let utf8 = match std::str::from_utf8(head) {
        Ok(_) => true,
        // a character cut off at the sniff boundary
        Err(e) => e.error_len().is_none(),
    };
    if !head.is_empty() && !head.contains(&0) && utf8 {
        mime::TEXT_PLAIN_UTF_8
    } else {
        mime::APPLICATION_OCTET_STREAM
    }
}

impl Client {
    /// Upload the file at `path`.
    pub async fn upload_media(&self, ctx: &Context, path: impl AsRef<Path>) -> Result<Attachment> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        self.upload_media_from_bytes(ctx, Media::new(data, file_name))
            .await
    }

    /// Upload everything readable from `reader`.
    pub async fn upload_media_from_reader<R>(
        &self,
        ctx: &Context,
        mut reader: R,
        file_name: &str,
    ) -> Result<Attachment>
    where
        R: AsyncRead + Unpin,
    {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.upload_media_from_bytes(ctx, Media::new(data, file_name))
            .await
    }

    pub async fn upload_media_from_bytes(&self, ctx: &Context, media: Media) -> Result<Attachment> {
        let form = media.into_form()?;
        self.call_multipart(ctx, "/api/v1/media", form).await
    }
}
