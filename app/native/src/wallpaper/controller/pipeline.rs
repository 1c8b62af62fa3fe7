//! Rotation and preview pipelines.
//!
//! These run off the control task. Network calls are awaited directly; decode,
//! composite and encode run on the blocking pool.

use std::sync::Arc;

use futures::future::try_join_all;

use super::ControllerError;
use super::messages::RotationReport;
use crate::config::{RotationMode, WallspanConfig};
use crate::unsplash::{Photo, PhotoSource, PhotoSourceError, choose_search_term};
use crate::wallpaper::desktop::DesktopIntegration;
use crate::wallpaper::geometry::{AspectClass, DisplayInfo, classify_aspect, compute_bounds};
use crate::wallpaper::history::PreviewEntry;
use crate::wallpaper::processing::{
    ProcessingError, RenderedSlice, SpanOptions, SpanOutput, canvas_size, decode_image,
    encode_jpeg, span_across_displays,
};
use crate::wallpaper::rotation::RotationFiles;
use crate::wallpaper::screens::DisplayEnumerator;

/// The collaborators a rotation talks to.
pub struct Services<P, D, W> {
    pub photos: Arc<P>,
    pub displays: Arc<D>,
    pub desktop: Arc<W>,
}

impl<P, D, W> Services<P, D, W> {
    pub fn new(photos: P, displays: D, desktop: W) -> Self {
        Self {
            photos: Arc::new(photos),
            displays: Arc::new(displays),
            desktop: Arc::new(desktop),
        }
    }
}

impl<P, D, W> Clone for Services<P, D, W> {
    fn clone(&self) -> Self {
        Self {
            photos: Arc::clone(&self.photos),
            displays: Arc::clone(&self.displays),
            desktop: Arc::clone(&self.desktop),
        }
    }
}

impl<P, D, W> Services<P, D, W>
where
    P: PhotoSource,
    D: DisplayEnumerator,
    W: DesktopIntegration,
{
    /// Fetches a photo and applies it according to `config.mode`.
    ///
    /// With `preset` the fetch is skipped and that photo is used instead.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the fetch, download, render or apply step.
    /// An empty display list fails before anything is written.
    pub async fn rotate(
        &self,
        config: &WallspanConfig,
        files: &mut RotationFiles,
        preset: Option<Photo>,
    ) -> Result<RotationReport, ControllerError> {
        let displays = self.snapshot()?;

        match config.mode {
            RotationMode::Span => self.rotate_span(config, files, displays, preset).await,
            RotationMode::Individual => {
                self.rotate_individual(config, files, displays, preset).await
            }
        }
    }

    /// Applies an already downloaded image according to `config.mode`.
    ///
    /// In individual mode every display receives the whole image.
    ///
    /// # Errors
    ///
    /// Fails when the image cannot be decoded or applied.
    pub async fn apply_image(
        &self,
        config: &WallspanConfig,
        files: &mut RotationFiles,
        bytes: Vec<u8>,
    ) -> Result<RotationReport, ControllerError> {
        let displays = self.snapshot()?;
        let quality = config.span_options(self.displays.vertical_axis()).jpeg_quality;

        let output = match config.mode {
            RotationMode::Span => {
                let options = config.span_options(self.displays.vertical_axis());
                render_span(bytes, displays, options).await?
            }
            RotationMode::Individual => {
                tokio::task::spawn_blocking(move || {
                    let image = decode_image(&bytes)?;
                    let encoded = encode_jpeg(&image, quality)?;
                    let (width, height) = (image.width(), image.height());
                    let rendered = displays
                        .iter()
                        .enumerate()
                        .map(|(index, display)| RenderedSlice {
                            index,
                            display: *display,
                            width,
                            height,
                            bytes: encoded.clone(),
                        })
                        .collect();
                    Ok::<_, ProcessingError>(SpanOutput { rendered, skipped: Vec::new() })
                })
                .await??
            }
        };

        self.apply_output(config, files, output, None)
    }

    /// Fetches a photo and its thumbnail for the preview history.
    ///
    /// # Errors
    ///
    /// Fails when no photo can be fetched or the thumbnail cannot be decoded.
    pub async fn fetch_preview(
        &self,
        config: &WallspanConfig,
    ) -> Result<PreviewEntry, ControllerError> {
        let displays = self.snapshot()?;
        let aspect = match config.mode {
            RotationMode::Span => classify_aspect(&compute_bounds(&displays)?),
            RotationMode::Individual => displays
                .first()
                .map_or(AspectClass::Landscape, |d| AspectClass::from_dimensions(d.width, d.height)),
        };

        let photo = self.fetch_photo(config, aspect).await?;
        let bytes = self.photos.download(&photo.thumb_url).await?;
        let thumbnail = tokio::task::spawn_blocking(move || decode_image(&bytes)).await??;

        tracing::debug!(id = %photo.id, "Fetched preview");
        Ok(PreviewEntry { photo, thumbnail })
    }

    fn snapshot(&self) -> Result<Vec<DisplayInfo>, ControllerError> {
        let displays = self.displays.list_displays();
        if displays.is_empty() {
            return Err(ProcessingError::NoDisplays.into());
        }
        Ok(displays)
    }

    async fn fetch_photo(
        &self,
        config: &WallspanConfig,
        aspect: AspectClass,
    ) -> Result<Photo, ControllerError> {
        let query = choose_search_term(&config.search_terms).ok_or(PhotoSourceError::NoQuery)?;
        tracing::debug!(query, aspect = %aspect, "Fetching photo");
        Ok(self.photos.fetch_one(query, aspect).await?)
    }

    async fn rotate_span(
        &self,
        config: &WallspanConfig,
        files: &mut RotationFiles,
        displays: Vec<DisplayInfo>,
        preset: Option<Photo>,
    ) -> Result<RotationReport, ControllerError> {
        let options = config.span_options(self.displays.vertical_axis());
        let (bounds, canvas_width, canvas_height) =
            canvas_size(&displays, options.render_multiplier)?;

        let photo = match preset {
            Some(photo) => photo,
            None => self.fetch_photo(config, classify_aspect(&bounds)).await?,
        };

        let url = photo.full_image_url(canvas_width.max(canvas_height), config.download_quality)?;
        let bytes = self.photos.download(&url).await?;
        tracing::debug!(bytes = bytes.len(), "Downloaded photo");

        let output = render_span(bytes, displays, options).await?;
        self.apply_output(config, files, output, Some(photo.credit()))
    }

    async fn rotate_individual(
        &self,
        config: &WallspanConfig,
        files: &mut RotationFiles,
        displays: Vec<DisplayInfo>,
        preset: Option<Photo>,
    ) -> Result<RotationReport, ControllerError> {
        let downloads = displays.iter().map(|display| {
            let preset = preset.clone();
            async move {
                let photo = match preset {
                    Some(photo) => photo,
                    None => {
                        let aspect = AspectClass::from_dimensions(display.width, display.height);
                        self.fetch_photo(config, aspect).await?
                    }
                };
                let (width, height) = display.native_size();
                let url = photo.full_image_url(width.max(height), config.download_quality)?;
                let bytes = self.photos.download(&url).await?;
                Ok::<_, ControllerError>((photo, bytes))
            }
        });
        let results = try_join_all(downloads).await?;

        let mut credits: Vec<String> = Vec::new();
        for (photo, _) in &results {
            let credit = photo.credit();
            if !credits.contains(&credit) {
                credits.push(credit);
            }
        }

        let quality = config.span_options(self.displays.vertical_axis()).jpeg_quality;
        let output = tokio::task::spawn_blocking(move || {
            let rendered = results
                .into_iter()
                .zip(displays)
                .enumerate()
                .map(|(index, ((_, bytes), display))| -> Result<RenderedSlice, ProcessingError> {
                    let image = decode_image(&bytes)?;
                    Ok(RenderedSlice {
                        index,
                        display,
                        width: image.width(),
                        height: image.height(),
                        bytes: encode_jpeg(&image, quality)?,
                    })
                })
                .collect::<Result<Vec<_>, ProcessingError>>()?;
            Ok::<_, ProcessingError>(SpanOutput { rendered, skipped: Vec::new() })
        })
        .await??;

        self.apply_output(config, files, output, Some(credits.join(", ")))
    }

    /// Writes a new generation of files and sets each as its display's wallpaper.
    fn apply_output(
        &self,
        config: &WallspanConfig,
        files: &mut RotationFiles,
        output: SpanOutput,
        credit: Option<String>,
    ) -> Result<RotationReport, ControllerError> {
        let skipped = output.skipped_summary();
        if config.strict_slices || output.rendered.is_empty() {
            if let Some(summary) = &skipped {
                return Err(ControllerError::SkippedSlices(summary.clone()));
            }
        }
        let mut warnings: Vec<String> = skipped.into_iter().collect();

        files.begin_rotation();
        let targets: Vec<DisplayInfo> = output.rendered.iter().map(|slice| slice.display).collect();
        self.desktop.prepare(&targets);

        let mut applied = Vec::with_capacity(output.rendered.len());
        let mut first_failure = None;
        for slice in &output.rendered {
            let path = files.write_slice(slice.index, &slice.bytes)?;
            match self.desktop.set_wallpaper(&path, &slice.display, config.scaling) {
                Ok(()) => applied.push(path),
                Err(err) => {
                    tracing::warn!(display = slice.display.id, error = %err, "Failed to set wallpaper");
                    warnings.push(format!("display {}: {err}", slice.display.id));
                    first_failure.get_or_insert(err);
                }
            }
        }

        if applied.is_empty() {
            if let Some(err) = first_failure {
                return Err(err.into());
            }
        }

        tracing::info!(count = applied.len(), "Applied wallpaper");
        Ok(RotationReport {
            credit,
            applied,
            warning: if warnings.is_empty() { None } else { Some(warnings.join("; ")) },
        })
    }
}

/// Decodes `bytes` and spans the image over `displays` on the blocking pool.
async fn render_span(
    bytes: Vec<u8>,
    displays: Vec<DisplayInfo>,
    options: SpanOptions,
) -> Result<SpanOutput, ControllerError> {
    let output = tokio::task::spawn_blocking(move || {
        let image = decode_image(&bytes)?;
        span_across_displays(&image, &displays, &options)
    })
    .await??;
    Ok(output)
}
