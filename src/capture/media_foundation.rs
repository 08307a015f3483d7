//! Media Foundation camera device
//!
//! Opens a video capture source by index and reads frames synchronously
//! through an `IMFSourceReader`. Video processing is enabled on the reader
//! so every camera can be asked for `RGB32` output regardless of its native
//! format (MJPG, NV12, YUY2...).

#![allow(unsafe_op_in_unsafe_fn)]

use windows::Win32::Media::MediaFoundation::{
    IMFActivate, IMFAttributes, IMFMediaSource, IMFSample, IMFSourceReader, MF_MT_DEFAULT_STRIDE,
    MF_MT_FRAME_SIZE, MF_MT_MAJOR_TYPE, MF_MT_SUBTYPE, MF_SOURCE_READER_ENABLE_VIDEO_PROCESSING,
    MF_SOURCE_READER_FIRST_VIDEO_STREAM, MF_SOURCE_READERF_CURRENTMEDIATYPECHANGED,
    MF_SOURCE_READERF_ENDOFSTREAM, MF_SOURCE_READERF_ERROR,
    MF_VERSION, MFCreateAttributes, MFCreateMediaType, MFCreateSourceReaderFromMediaSource,
    MFEnumDeviceSources, MFMediaType_Video, MFSTARTUP_FULL, MFShutdown, MFStartup,
    MFVideoFormat_RGB32, MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE,
    MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE_VIDCAP_GUID,
};
use windows::Win32::System::Com::{
    CoInitializeEx, CoTaskMemFree, CoUninitialize, COINIT_APARTMENTTHREADED,
};

use crate::capture::camera::{CameraDevice, CameraError};
use crate::capture::frame::{Frame, PixelLayout};

/// Camera opened through Media Foundation
pub struct MediaFoundationCamera {
    index: u32,
    source: Option<IMFMediaSource>,
    reader: Option<IMFSourceReader>,
    format: VideoFormat,
}

/// Output format currently negotiated on the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VideoFormat {
    width: u32,
    height: u32,
    /// Signed default stride; negative means bottom-up rows
    stride: i32,
}

impl VideoFormat {
    /// Decodes `MF_MT_FRAME_SIZE` (width in the high dword) and the optional
    /// `MF_MT_DEFAULT_STRIDE`, which holds an `i32` in a `u32` attribute
    fn from_attributes(packed_size: u64, default_stride: Option<u32>) -> Self {
        let width = (packed_size >> 32) as u32;
        let height = (packed_size & 0xFFFF_FFFF) as u32;
        // Missing stride attribute means a tightly packed top-down image
        let stride = default_stride.map_or((width * 4) as i32, |raw| raw as i32);
        Self {
            width,
            height,
            stride,
        }
    }

    unsafe fn of_reader(reader: &IMFSourceReader) -> windows::core::Result<Self> {
        let current = reader.GetCurrentMediaType(MF_SOURCE_READER_FIRST_VIDEO_STREAM.0 as u32)?;
        let packed = current.GetUINT64(&MF_MT_FRAME_SIZE)?;
        Ok(Self::from_attributes(
            packed,
            current.GetUINT32(&MF_MT_DEFAULT_STRIDE).ok(),
        ))
    }
}

impl MediaFoundationCamera {
    /// Opens the video capture device at `index`
    ///
    /// Initializes COM and Media Foundation for the calling thread. Both are
    /// torn down again by `release`, or right here if opening fails.
    pub fn open(index: u32) -> Result<Self, CameraError> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED).map_err(|e| open_failed(index, e))?;

            if let Err(e) = MFStartup(MF_VERSION, MFSTARTUP_FULL) {
                CoUninitialize();
                return Err(open_failed(index, e));
            }

            match Self::open_reader(index) {
                Ok(camera) => Ok(camera),
                Err(err) => {
                    let _ = MFShutdown();
                    CoUninitialize();
                    Err(err)
                }
            }
        }
    }

    unsafe fn open_reader(index: u32) -> Result<Self, CameraError> {
        let source = Self::activate_source(index)?;

        let mut attributes: Option<IMFAttributes> = None;
        MFCreateAttributes(&mut attributes, 1).map_err(|e| open_failed(index, e))?;
        let attributes = attributes.ok_or_else(|| CameraError::OpenFailed {
            index,
            reason: "no reader attributes".to_string(),
        })?;
        attributes
            .SetUINT32(&MF_SOURCE_READER_ENABLE_VIDEO_PROCESSING, 1)
            .map_err(|e| open_failed(index, e))?;

        let reader = MFCreateSourceReaderFromMediaSource(&source, &attributes)
            .map_err(|e| open_failed(index, e))?;

        let stream = MF_SOURCE_READER_FIRST_VIDEO_STREAM.0 as u32;
        let requested = MFCreateMediaType().map_err(|e| open_failed(index, e))?;
        requested
            .SetGUID(&MF_MT_MAJOR_TYPE, &MFMediaType_Video)
            .map_err(|e| open_failed(index, e))?;
        requested
            .SetGUID(&MF_MT_SUBTYPE, &MFVideoFormat_RGB32)
            .map_err(|e| open_failed(index, e))?;
        reader
            .SetCurrentMediaType(stream, None, &requested)
            .map_err(|e| open_failed(index, e))?;

        let format = VideoFormat::of_reader(&reader).map_err(|e| open_failed(index, e))?;
        log::debug!("Camera {index} negotiated {format:?} RGB32");

        Ok(Self {
            index,
            source: Some(source),
            reader: Some(reader),
            format,
        })
    }

    /// Enumerates capture devices and activates the one at `index`
    unsafe fn activate_source(index: u32) -> Result<IMFMediaSource, CameraError> {
        let mut attributes: Option<IMFAttributes> = None;
        MFCreateAttributes(&mut attributes, 1).map_err(|e| open_failed(index, e))?;
        let attributes = attributes.ok_or_else(|| CameraError::OpenFailed {
            index,
            reason: "no enumeration attributes".to_string(),
        })?;
        attributes
            .SetGUID(
                &MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE,
                &MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE_VIDCAP_GUID,
            )
            .map_err(|e| open_failed(index, e))?;

        let mut devices: *mut Option<IMFActivate> = std::ptr::null_mut();
        let mut count: u32 = 0;
        MFEnumDeviceSources(&attributes, &mut devices, &mut count)
            .map_err(|e| open_failed(index, e))?;

        // Take ownership of every activation object so they are released,
        // then free the array itself
        let activations: Vec<Option<IMFActivate>> = if devices.is_null() {
            Vec::new()
        } else {
            let slice = std::slice::from_raw_parts_mut(devices, count as usize);
            let taken = slice.iter_mut().map(Option::take).collect();
            CoTaskMemFree(Some(devices as *const _));
            taken
        };

        let activation = activations
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(CameraError::DeviceNotFound {
                index,
                available: count,
            })?;

        activation
            .ActivateObject::<IMFMediaSource>()
            .map_err(|e| open_failed(index, e))
    }

    /// Frame size negotiated with the device
    pub fn frame_size(&self) -> (u32, u32) {
        (self.format.width, self.format.height)
    }
}

impl CameraDevice for MediaFoundationCamera {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let reader = self.reader.as_ref().ok_or(CameraError::Released)?;

        let mut flags: u32 = 0;
        let mut sample: Option<IMFSample> = None;
        unsafe {
            reader
                .ReadSample(
                    MF_SOURCE_READER_FIRST_VIDEO_STREAM.0 as u32,
                    0,
                    None,
                    Some(&mut flags as *mut u32),
                    None,
                    Some(&mut sample as *mut _),
                )
                .map_err(|e| CameraError::ReadFailed(e.message().to_string()))?;
        }

        let failure_flags =
            MF_SOURCE_READERF_ERROR.0 as u32 | MF_SOURCE_READERF_ENDOFSTREAM.0 as u32;
        if flags & failure_flags != 0 {
            return Err(CameraError::ReadFailed(format!("stream flags {flags:#x}")));
        }

        if flags & MF_SOURCE_READERF_CURRENTMEDIATYPECHANGED.0 as u32 != 0 {
            self.format = unsafe { VideoFormat::of_reader(reader) }
                .map_err(|e| CameraError::ReadFailed(e.message().to_string()))?;
            log::info!(
                "Camera {} format changed to {}x{}",
                self.index,
                self.format.width,
                self.format.height
            );
        }

        // Stream ticks arrive without a sample
        let sample = sample.ok_or(CameraError::FrameUnavailable)?;

        let data = unsafe {
            let buffer = sample
                .ConvertToContiguousBuffer()
                .map_err(|e| CameraError::ReadFailed(e.message().to_string()))?;

            let mut ptr: *mut u8 = std::ptr::null_mut();
            let mut length: u32 = 0;
            buffer
                .Lock(&mut ptr, None, Some(&mut length as *mut u32))
                .map_err(|e| CameraError::ReadFailed(e.message().to_string()))?;
            let data = if ptr.is_null() {
                Vec::new()
            } else {
                std::slice::from_raw_parts(ptr, length as usize).to_vec()
            };
            let _ = buffer.Unlock();
            data
        };

        let format = self.format;
        let frame = Frame::with_stride(
            format.width,
            format.height,
            PixelLayout::Bgrx32,
            format.stride.unsigned_abs() as usize,
            format.stride < 0,
            data,
        )?;
        Ok(frame)
    }

    fn release(&mut self) {
        if self.reader.is_none() && self.source.is_none() {
            return;
        }

        self.reader = None;
        if let Some(source) = self.source.take() {
            unsafe {
                if let Err(e) = source.Shutdown() {
                    log::warn!("Camera {} source shutdown failed: {}", self.index, e);
                }
            }
        }

        unsafe {
            let _ = MFShutdown();
            CoUninitialize();
        }
        log::debug!("Camera {} released", self.index);
    }
}

impl Drop for MediaFoundationCamera {
    fn drop(&mut self) {
        self.release();
    }
}

fn open_failed(index: u32, error: windows::core::Error) -> CameraError {
    CameraError::OpenFailed {
        index,
        reason: error.message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_unpacks_width_from_high_dword() {
        let format = VideoFormat::from_attributes((1280u64 << 32) | 720, Some(5120));
        assert_eq!(
            format,
            VideoFormat {
                width: 1280,
                height: 720,
                stride: 5120
            }
        );
    }

    #[test]
    fn negative_stride_survives_the_u32_attribute() {
        let format = VideoFormat::from_attributes((640u64 << 32) | 480, Some((-2560i32) as u32));
        assert_eq!(format.stride, -2560);
    }

    #[test]
    fn missing_stride_means_packed_rows() {
        let format = VideoFormat::from_attributes((320u64 << 32) | 240, None);
        assert_eq!(format.stride, 1280);
    }
}
