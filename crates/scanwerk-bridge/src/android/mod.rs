// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android bindings via JNI: ML Kit document scanner and text recognizer.
//
// Requires the Android NDK and the Play services ML Kit artifacts
// (`play-services-mlkit-document-scanner`, `text-recognition`) on the host
// app's classpath.
//
// ## Architecture notes
//
// ML Kit exposes asynchronous `Task`s. Both services resolve them with the
// blocking `Tasks.await`, which throws when called on the main thread, so:
//
// - `start_scan_intent` must run off the UI thread; the resulting
//   `IntentSender` is handed back as a global reference and launched by
//   `ActivityLauncher` (which may run on any thread).
// - `recognize` already runs on the scanner's blocking worker pool.
//
// The capture result arrives in the host Activity's `onActivityResult`.
// The host forwards the `Intent` to `AndroidCaptureService::decode_result`
// and passes the payload into `DocumentScanner::process_scan_result`.

#![cfg(target_os = "android")]

use std::io::Cursor;

use image::DynamicImage;
use jni::JNIEnv;
use jni::objects::{JByteArray, JObject, JString, JValue};

use scanwerk_core::ScannerMode;

use crate::traits::*;

// ---------------------------------------------------------------------------
// ML Kit constants
// ---------------------------------------------------------------------------

/// `GmsDocumentScannerOptions.SCANNER_MODE_FULL`.
const SCANNER_MODE_FULL: i32 = 1;
/// `GmsDocumentScannerOptions.SCANNER_MODE_BASE`.
const SCANNER_MODE_BASE: i32 = 3;

const OPTIONS_BUILDER_CLASS: &str =
    "com/google/mlkit/vision/documentscanner/GmsDocumentScannerOptions$Builder";
const SCANNING_CLASS: &str = "com/google/mlkit/vision/documentscanner/GmsDocumentScanning";
const SCANNING_RESULT_CLASS: &str =
    "com/google/mlkit/vision/documentscanner/GmsDocumentScanningResult";
const TASKS_CLASS: &str = "com/google/android/gms/tasks/Tasks";

fn mode_constant(mode: ScannerMode) -> i32 {
    match mode {
        ScannerMode::Full => SCANNER_MODE_FULL,
        ScannerMode::Base => SCANNER_MODE_BASE,
    }
}

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Obtain a [`JNIEnv`] handle from the global Android context, attaching the
/// current thread if needed.
fn jni_env() -> BridgeResult<JNIEnv<'static>> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| BridgeError::Initialization(format!("failed to obtain JavaVM: {e}")))?;
    vm.attach_current_thread_permanently()
        .map_err(|e| BridgeError::Initialization(format!("failed to attach JNI thread: {e}")))
}

/// The hosting `Activity`.
fn activity() -> BridgeResult<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(BridgeError::Initialization(
            "Android context is null; native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Clear any pending Java exception and describe the failed call.
///
/// A pending exception poisons every later JNI call on this thread, so each
/// error path must clear it before returning.
fn describe(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> String {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    format!("{context}: {e}")
}

fn init_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> BridgeError {
    BridgeError::Initialization(describe(env, context, e))
}

fn request_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> BridgeError {
    BridgeError::Request(describe(env, context, e))
}

/// Block on a `com.google.android.gms.tasks.Task` and return its result.
fn await_task<'a>(env: &mut JNIEnv<'a>, task: &JObject<'_>) -> jni::errors::Result<JObject<'a>> {
    env.call_static_method(
        TASKS_CLASS,
        "await",
        "(Lcom/google/android/gms/tasks/Task;)Ljava/lang/Object;",
        &[JValue::Object(task)],
    )?
    .l()
}

fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> jni::errors::Result<String> {
    Ok(env.get_string(&JString::from(obj))?.into())
}

// ---------------------------------------------------------------------------
// Capture service: GmsDocumentScanning
// ---------------------------------------------------------------------------

/// ML Kit document scanner.
///
/// Zero-sized; all state lives on the Java side.
pub struct AndroidCaptureService;

impl AndroidCaptureService {
    /// Create the service. Does **not** touch JNI until first use.
    pub fn new() -> Self {
        Self
    }

    /// Decode the `Intent` delivered to `onActivityResult` into a payload.
    ///
    /// Returns `Ok(None)` when `data` is null or ML Kit cannot parse it, the
    /// same shape the scanner treats as a cancelled capture.
    pub fn decode_result(&self, data: &JObject<'_>) -> BridgeResult<Option<CapturePayload>> {
        if data.is_null() {
            return Ok(None);
        }
        let mut env = jni_env()?;

        let result = env
            .call_static_method(
                SCANNING_RESULT_CLASS,
                "fromActivityResultIntent",
                "(Landroid/content/Intent;)Lcom/google/mlkit/vision/documentscanner/GmsDocumentScanningResult;",
                &[JValue::Object(data)],
            )
            .and_then(|v| v.l())
            .map_err(|e| request_err(&mut env, "fromActivityResultIntent", e))?;
        if result.is_null() {
            return Ok(None);
        }

        let pages = env
            .call_method(&result, "getPages", "()Ljava/util/List;", &[])
            .and_then(|v| v.l())
            .map_err(|e| request_err(&mut env, "getPages", e))?;
        if pages.is_null() {
            return Ok(Some(CapturePayload::default()));
        }

        let count = env
            .call_method(&pages, "size", "()I", &[])
            .and_then(|v| v.i())
            .map_err(|e| request_err(&mut env, "List.size", e))?;

        let mut records = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let page = env
                .call_method(&pages, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])
                .and_then(|v| v.l())
                .map_err(|e| request_err(&mut env, "List.get", e))?;
            if page.is_null() {
                records.push(PageRecord::default());
                continue;
            }

            let uri = env
                .call_method(&page, "getImageUri", "()Landroid/net/Uri;", &[])
                .and_then(|v| v.l())
                .map_err(|e| request_err(&mut env, "Page.getImageUri", e))?;
            if uri.is_null() {
                records.push(PageRecord::default());
                continue;
            }

            let uri_string = env
                .call_method(&uri, "toString", "()Ljava/lang/String;", &[])
                .and_then(|v| v.l())
                .and_then(|s| java_string(&mut env, s))
                .map_err(|e| request_err(&mut env, "Uri.toString", e))?;
            records.push(PageRecord::with_uri(uri_string));
        }

        tracing::info!(pages = records.len(), "Android: scan result decoded");
        Ok(Some(CapturePayload { pages: records }))
    }
}

impl Default for AndroidCaptureService {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCaptureService for AndroidCaptureService {
    fn name(&self) -> &str {
        "ML Kit document scanner"
    }

    /// Build `GmsDocumentScannerOptions`, obtain a scanner client, and
    /// resolve its start intent.
    fn start_scan_intent(&self, request: &CaptureRequest) -> BridgeResult<LaunchToken> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(
            mode = ?request.mode,
            page_limit = request.page_limit,
            gallery_import = request.gallery_import,
            "Android: building document scanner options"
        );

        // -- Options + client: failures here mean the scanner cannot start ---
        let builder = env
            .new_object(OPTIONS_BUILDER_CLASS, "()V", &[])
            .map_err(|e| init_err(&mut env, "new GmsDocumentScannerOptions.Builder", e))?;

        let builder_sig = format!("(I)L{OPTIONS_BUILDER_CLASS};");
        env.call_method(
            &builder,
            "setScannerMode",
            &builder_sig,
            &[JValue::Int(mode_constant(request.mode))],
        )
        .map_err(|e| init_err(&mut env, "setScannerMode", e))?;

        env.call_method(
            &builder,
            "setPageLimit",
            &builder_sig,
            &[JValue::Int(request.page_limit as i32)],
        )
        .map_err(|e| init_err(&mut env, "setPageLimit", e))?;

        env.call_method(
            &builder,
            "setGalleryImportAllowed",
            format!("(Z)L{OPTIONS_BUILDER_CLASS};"),
            &[JValue::Bool(u8::from(request.gallery_import))],
        )
        .map_err(|e| init_err(&mut env, "setGalleryImportAllowed", e))?;

        let options = env
            .call_method(
                &builder,
                "build",
                "()Lcom/google/mlkit/vision/documentscanner/GmsDocumentScannerOptions;",
                &[],
            )
            .and_then(|v| v.l())
            .map_err(|e| init_err(&mut env, "Builder.build", e))?;

        let client = env
            .call_static_method(
                SCANNING_CLASS,
                "getClient",
                "(Lcom/google/mlkit/vision/documentscanner/GmsDocumentScannerOptions;)Lcom/google/mlkit/vision/documentscanner/GmsDocumentScanner;",
                &[JValue::Object(&options)],
            )
            .and_then(|v| v.l())
            .map_err(|e| init_err(&mut env, "GmsDocumentScanning.getClient", e))?;

        // -- Start intent: failures here are request failures ----------------
        let task = env
            .call_method(
                &client,
                "getStartScanIntent",
                "(Landroid/app/Activity;)Lcom/google/android/gms/tasks/Task;",
                &[JValue::Object(&activity)],
            )
            .and_then(|v| v.l())
            .map_err(|e| request_err(&mut env, "getStartScanIntent", e))?;

        let sender = await_task(&mut env, &task)
            .map_err(|e| request_err(&mut env, "Tasks.await(getStartScanIntent)", e))?;
        if sender.is_null() {
            return Err(BridgeError::Request(
                "scanner returned a null IntentSender".into(),
            ));
        }

        let global = env
            .new_global_ref(sender)
            .map_err(|e| request_err(&mut env, "new_global_ref(IntentSender)", e))?;

        tracing::info!("Android: scanner intent ready");
        Ok(LaunchToken::IntentSender(global))
    }

    /// Read a `content://` page URI through the `ContentResolver`.
    fn load_page(&self, image_uri: &str) -> BridgeResult<Vec<u8>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let io = |env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error| {
            BridgeError::Io(describe(env, context, e))
        };

        let j_uri_str = env
            .new_string(image_uri)
            .map_err(|e| io(&mut env, "new_string(uri)", e))?;

        let uri_obj = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&j_uri_str)],
            )
            .and_then(|v| v.l())
            .map_err(|e| io(&mut env, "Uri.parse", e))?;

        let resolver = env
            .call_method(
                &activity,
                "getContentResolver",
                "()Landroid/content/ContentResolver;",
                &[],
            )
            .and_then(|v| v.l())
            .map_err(|e| io(&mut env, "getContentResolver", e))?;

        let input_stream = env
            .call_method(
                &resolver,
                "openInputStream",
                "(Landroid/net/Uri;)Ljava/io/InputStream;",
                &[JValue::Object(&uri_obj)],
            )
            .and_then(|v| v.l())
            .map_err(|e| io(&mut env, "openInputStream", e))?;

        if input_stream.is_null() {
            return Err(BridgeError::Io(format!(
                "ContentResolver returned null InputStream for {image_uri}"
            )));
        }

        let baos = env
            .new_object("java/io/ByteArrayOutputStream", "()V", &[])
            .map_err(|e| io(&mut env, "new ByteArrayOutputStream", e))?;

        let buffer = env
            .new_byte_array(8192)
            .map_err(|e| io(&mut env, "new_byte_array(8192)", e))?;

        loop {
            let bytes_read = env
                .call_method(&input_stream, "read", "([B)I", &[JValue::Object(&buffer)])
                .and_then(|v| v.i())
                .map_err(|e| io(&mut env, "InputStream.read", e))?;
            if bytes_read < 0 {
                break;
            }
            env.call_method(
                &baos,
                "write",
                "([BII)V",
                &[
                    JValue::Object(&buffer),
                    JValue::Int(0),
                    JValue::Int(bytes_read),
                ],
            )
            .map_err(|e| io(&mut env, "ByteArrayOutputStream.write", e))?;
        }

        env.call_method(&input_stream, "close", "()V", &[])
            .map_err(|e| io(&mut env, "InputStream.close", e))?;

        let java_bytes = env
            .call_method(&baos, "toByteArray", "()[B", &[])
            .and_then(|v| v.l())
            .map_err(|e| io(&mut env, "toByteArray", e))?;

        let array = JByteArray::from(java_bytes);
        let bytes = env
            .convert_byte_array(&array)
            .map_err(|e| io(&mut env, "convert_byte_array", e))?;

        tracing::info!(uri = image_uri, bytes = bytes.len(), "Android: page loaded");
        Ok(bytes)
    }
}

/// Launches the scanner `IntentSender` from the hosting Activity with
/// [`REQUEST_DOCUMENT_SCAN`]. The host must route that request code's
/// `onActivityResult` back into the scanner.
pub struct ActivityLauncher;

impl ScanLauncher for ActivityLauncher {
    fn launch(&self, token: LaunchToken) -> BridgeResult<()> {
        let LaunchToken::IntentSender(sender) = token else {
            return Err(BridgeError::Request(
                "Android launcher needs an IntentSender token".into(),
            ));
        };
        let mut env = jni_env()?;
        let activity = activity()?;

        env.call_method(
            &activity,
            "startIntentSenderForResult",
            "(Landroid/content/IntentSender;ILandroid/content/Intent;III)V",
            &[
                JValue::Object(sender.as_obj()),
                JValue::Int(REQUEST_DOCUMENT_SCAN),
                JValue::Object(&JObject::null()),
                JValue::Int(0),
                JValue::Int(0),
                JValue::Int(0),
            ],
        )
        .map_err(|e| request_err(&mut env, "startIntentSenderForResult", e))?;

        tracing::info!(
            request_code = REQUEST_DOCUMENT_SCAN,
            "Android: scanner launched, awaiting onActivityResult"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recognition service: ML Kit TextRecognition (Latin)
// ---------------------------------------------------------------------------

/// ML Kit on-device text recognizer (Latin script model).
pub struct MlKitTextRecognizer;

impl MlKitTextRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MlKitTextRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognitionService for MlKitTextRecognizer {
    fn name(&self) -> &str {
        "ML Kit text recognition"
    }

    /// Decode the page into a `Bitmap` in memory, wrap it in an `InputImage`,
    /// and block on `TextRecognizer.process`.
    ///
    /// Nothing is staged on disk, so overlapping calls never see each
    /// other's pages. The Latin model has no language switch, so `languages`
    /// only feeds the log line.
    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> BridgeResult<String> {
        let encoded = encode_for_recognition(image)?;

        let mut env = jni_env()?;
        let rec = |env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error| {
            BridgeError::Recognition(describe(env, context, e))
        };

        tracing::info!(
            width = image.width(),
            height = image.height(),
            ?languages,
            "Android: starting ML Kit text recognition"
        );

        // -- BitmapFactory.decodeByteArray -> InputImage.fromBitmap ----------
        let byte_array = env
            .byte_array_from_slice(&encoded)
            .map_err(|e| rec(&mut env, "byte_array_from_slice", e))?;
        let length = i32::try_from(encoded.len())
            .map_err(|_| BridgeError::Recognition("page too large for a Java array".into()))?;
        let bitmap = env
            .call_static_method(
                "android/graphics/BitmapFactory",
                "decodeByteArray",
                "([BII)Landroid/graphics/Bitmap;",
                &[
                    JValue::Object(&byte_array),
                    JValue::Int(0),
                    JValue::Int(length),
                ],
            )
            .and_then(|v| v.l())
            .map_err(|e| rec(&mut env, "BitmapFactory.decodeByteArray", e))?;
        if bitmap.is_null() {
            return Err(BridgeError::Recognition("BitmapFactory could not decode page".into()));
        }

        let result = recognize_bitmap(&mut env, &bitmap);

        if let Err(e) = env.call_method(&bitmap, "recycle", "()V", &[]) {
            tracing::warn!(error = %describe(&mut env, "Bitmap.recycle", e), "Android: bitmap not recycled");
        }

        let text = result?;
        tracing::info!(chars = text.chars().count(), "Android: recognition complete");
        Ok(text)
    }
}

/// PNG-encode a page for `BitmapFactory`.
fn encode_for_recognition(image: &DynamicImage) -> BridgeResult<Vec<u8>> {
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
        .map_err(|e| BridgeError::Recognition(format!("PNG encoding failed: {e}")))?;
    Ok(encoded)
}

/// Run the Latin text recognizer over a decoded `Bitmap`.
fn recognize_bitmap(env: &mut JNIEnv<'_>, bitmap: &JObject<'_>) -> BridgeResult<String> {
    let rec = |env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error| {
        BridgeError::Recognition(describe(env, context, e))
    };

    let input_image = env
        .call_static_method(
            "com/google/mlkit/vision/common/InputImage",
            "fromBitmap",
            "(Landroid/graphics/Bitmap;I)Lcom/google/mlkit/vision/common/InputImage;",
            &[JValue::Object(bitmap), JValue::Int(0)],
        )
        .and_then(|v| v.l())
        .map_err(|e| rec(env, "InputImage.fromBitmap", e))?;

    // -- TextRecognition.getClient(TextRecognizerOptions.DEFAULT_OPTIONS) -
    let options = env
        .get_static_field(
            "com/google/mlkit/vision/text/latin/TextRecognizerOptions",
            "DEFAULT_OPTIONS",
            "Lcom/google/mlkit/vision/text/latin/TextRecognizerOptions;",
        )
        .and_then(|v| v.l())
        .map_err(|_| BridgeError::Unavailable("ML Kit text recognition"))?;
    let recognizer = env
        .call_static_method(
            "com/google/mlkit/vision/text/TextRecognition",
            "getClient",
            "(Lcom/google/mlkit/vision/text/TextRecognizerOptionsInterface;)Lcom/google/mlkit/vision/text/TextRecognizer;",
            &[JValue::Object(&options)],
        )
        .and_then(|v| v.l())
        .map_err(|e| rec(env, "TextRecognition.getClient", e))?;

    let task = env
        .call_method(
            &recognizer,
            "process",
            "(Lcom/google/mlkit/vision/common/InputImage;)Lcom/google/android/gms/tasks/Task;",
            &[JValue::Object(&input_image)],
        )
        .and_then(|v| v.l())
        .map_err(|e| rec(env, "TextRecognizer.process", e))?;

    let vision_text = await_task(env, &task)
        .map_err(|e| rec(env, "Tasks.await(process)", e))?;
    if vision_text.is_null() {
        return Err(BridgeError::Recognition("recognizer returned null".into()));
    }

    let text = env
        .call_method(&vision_text, "getText", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .and_then(|s| java_string(env, s))
        .map_err(|e| rec(env, "Text.getText", e))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn recognition_input_is_built_per_call_in_memory() {
        let dark = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([10, 10, 10])));
        let light = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([240, 240, 240])));

        let dark_bytes = encode_for_recognition(&dark).expect("encode dark");
        let light_bytes = encode_for_recognition(&light).expect("encode light");
        assert_ne!(dark_bytes, light_bytes);

        let decoded = image::load_from_memory(&dark_bytes).expect("decode");
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0), &Rgb([10, 10, 10]));
    }
}
