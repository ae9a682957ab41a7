// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Window reads go through the hosting Activity: decor view for insets and the
// visible frame, the window manager for display rotation, and Resources for
// the `status_bar_height` dimension. All of them must run on the main looper.
//
// ## Architecture notes
//
// The host hands over its Activity through `nativeInit(Activity)` from
// `onCreate`; until then every read fails with `PlatformUnavailable`.
//
// Rust cannot post to the main looper on its own. `AndroidUiDispatcher`
// parks each task under a token and calls the host glue class
// `com.sysbars.SystemBarsBridge.postToUiThread(Activity, long)`, whose
// Runnable calls back into `nativeRunUiTask(long)` below. The same class
// forwards `onConfigurationChanged` to `nativeOnConfigurationChanged()`.
// See `ANDROID-INTEGRATION.md` for the Java side.

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, Once, OnceLock, PoisonError, RwLock};

use jni::objects::{GlobalRef, JClass, JObject, JValue};
use jni::sys::jlong;
use jni::{JNIEnv, JavaVM};

use sysbars_core::error::{Result, SysBarsError};
use sysbars_core::types::{Insets, Rect, WindowInsetsSnapshot};

use crate::traits::{UiDispatcher, UiTask, WindowHost};

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Binary name of the host glue class, as passed to `ClassLoader.loadClass`.
const HOST_BRIDGE_CLASS: &str = "com.sysbars.SystemBarsBridge";

/// Local reference capacity for one batch of window reads.
const LOCAL_FRAME_CAPACITY: i32 = 16;

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

/// Activity handed over by `nativeInit`, replaced when the Activity is
/// recreated and cleared by `nativeRelease`.
static HOST_ACTIVITY: RwLock<Option<GlobalRef>> = RwLock::new(None);

static NDK_CONTEXT: Once = Once::new();

/// The process-wide `JavaVM`, recorded by `nativeInit`.
fn java_vm() -> Result<&'static JavaVM> {
    JAVA_VM.get().ok_or_else(|| {
        tracing::error!("Android: no JavaVM, SystemBarsBridge.init was not called");
        SysBarsError::PlatformUnavailable
    })
}

/// Obtain a [`JNIEnv`] for the current thread, attaching it if needed.
///
/// The main looper is already attached; tokio workers stay attached for the
/// rest of their life, which avoids an attach/detach per call.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| SysBarsError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// The hosting Android `Activity`.
fn activity() -> Result<GlobalRef> {
    HOST_ACTIVITY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or_else(|| {
            tracing::error!("Android: no host Activity attached");
            SysBarsError::PlatformUnavailable
        })
}

/// Record the VM and Activity passed to `nativeInit`.
fn attach_host(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> jni::errors::Result<()> {
    if JAVA_VM.get().is_none() {
        // A concurrent init may win the race; both hold the same VM.
        let _ = JAVA_VM.set(env.get_java_vm()?);
    }
    let application = env
        .call_method(
            activity,
            "getApplicationContext",
            "()Landroid/content/Context;",
            &[],
        )?
        .l()?;
    let application = env.new_global_ref(application)?;
    let activity = env.new_global_ref(activity)?;
    *HOST_ACTIVITY.write().unwrap_or_else(PoisonError::into_inner) = Some(activity);
    publish_ndk_context(application);
    Ok(())
}

/// Publish the VM and application context through `ndk_context`, once per
/// process, for other crates linked into the same library.
fn publish_ndk_context(application: GlobalRef) {
    NDK_CONTEXT.call_once(|| {
        let Some(vm) = JAVA_VM.get() else {
            return;
        };
        let vm_ptr = vm.get_java_vm_pointer();
        let context_ptr = application.as_obj().as_raw();
        // SAFETY: the VM outlives the process' native code and the global
        // reference is leaked below, so both pointers stay valid.
        let published = catch_unwind(AssertUnwindSafe(|| unsafe {
            ndk_context::initialize_android_context(vm_ptr.cast(), context_ptr.cast())
        }));
        match published {
            Ok(()) => {
                std::mem::forget(application);
                tracing::debug!("Android: ndk_context initialised");
            }
            // NativeActivity hosts have already published a context.
            Err(_) => tracing::debug!("Android: ndk_context was already initialised"),
        }
    });
}

/// Drop the Activity if it is still the one attached.
fn detach_host(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> jni::errors::Result<bool> {
    let mut host = HOST_ACTIVITY.write().unwrap_or_else(PoisonError::into_inner);
    let Some(current) = host.as_ref() else {
        return Ok(false);
    };
    if env.is_same_object(current.as_obj(), activity)? {
        host.take();
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Map a JNI result into the bridge error, clearing any pending Java
/// exception so the next call starts clean.
fn checked<T>(env: &mut JNIEnv<'_>, context: &str, result: jni::errors::Result<T>) -> Result<T> {
    result.map_err(|e| {
        if env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        SysBarsError::Bridge(format!("{context}: {e}"))
    })
}

fn int_field(env: &mut JNIEnv<'_>, obj: &JObject<'_>, name: &str) -> jni::errors::Result<i32> {
    env.get_field(obj, name, "I")?.i()
}

/// `activity.getWindow().getDecorView()`
fn decor_view<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject<'_>,
) -> jni::errors::Result<JObject<'local>> {
    let window = env
        .call_method(activity, "getWindow", "()Landroid/view/Window;", &[])?
        .l()?;
    env.call_method(&window, "getDecorView", "()Landroid/view/View;", &[])?
        .l()
}

/// `windowInsets.getInsets(typeMask)` as plain [`Insets`].
fn read_insets(
    env: &mut JNIEnv<'_>,
    window_insets: &JObject<'_>,
    type_mask: i32,
) -> jni::errors::Result<Insets> {
    let insets = env
        .call_method(
            window_insets,
            "getInsets",
            "(I)Landroid/graphics/Insets;",
            &[JValue::Int(type_mask)],
        )?
        .l()?;
    Ok(Insets::new(
        int_field(env, &insets, "left")?,
        int_field(env, &insets, "top")?,
        int_field(env, &insets, "right")?,
        int_field(env, &insets, "bottom")?,
    ))
}

/// `WindowInsets.Type.<name>()` type mask.
fn inset_type(env: &mut JNIEnv<'_>, name: &str) -> jni::errors::Result<i32> {
    env.call_static_method("android/view/WindowInsets$Type", name, "()I", &[])?
        .i()
}

// ---------------------------------------------------------------------------
// AndroidWindow: decor view, display and resources
// ---------------------------------------------------------------------------

/// Window reads against the hosting Activity.
///
/// Zero-sized; all state lives on the Java side.
pub struct AndroidWindow;

impl AndroidWindow {
    /// Create the window handle. No JNI call happens until a read.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHost for AndroidWindow {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn sdk_level(&self) -> Result<u32> {
        let mut env = jni_env()?;
        let sdk = env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
            .and_then(|v| v.i());
        let sdk = checked(&mut env, "Build.VERSION.SDK_INT", sdk)?;
        Ok(u32::try_from(sdk).unwrap_or(0))
    }

    fn display_rotation(&self) -> Result<i32> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let rotation = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> jni::errors::Result<_> {
            let manager = env
                .call_method(
                    &activity,
                    "getWindowManager",
                    "()Landroid/view/WindowManager;",
                    &[],
                )?
                .l()?;
            let display = env
                .call_method(&manager, "getDefaultDisplay", "()Landroid/view/Display;", &[])?
                .l()?;
            env.call_method(&display, "getRotation", "()I", &[])?.i()
        });
        checked(&mut env, "Display.getRotation", rotation)
    }

    fn root_window_insets(&self) -> Result<Option<WindowInsetsSnapshot>> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let snapshot = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> jni::errors::Result<_> {
            let decor = decor_view(env, &activity)?;
            let insets = env
                .call_method(
                    &decor,
                    "getRootWindowInsets",
                    "()Landroid/view/WindowInsets;",
                    &[],
                )?
                .l()?;
            if insets.is_null() {
                return Ok(None);
            }
            let system_mask = inset_type(env, "systemBars")?;
            let navigation_mask = inset_type(env, "navigationBars")?;
            Ok(Some(WindowInsetsSnapshot {
                system_bars: read_insets(env, &insets, system_mask)?,
                navigation_bars: read_insets(env, &insets, navigation_mask)?,
            }))
        });
        checked(&mut env, "View.getRootWindowInsets", snapshot)
    }

    fn visible_display_frame(&self) -> Result<Rect> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let frame = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> jni::errors::Result<_> {
            let decor = decor_view(env, &activity)?;
            let rect = env.new_object("android/graphics/Rect", "()V", &[])?;
            env.call_method(
                &decor,
                "getWindowVisibleDisplayFrame",
                "(Landroid/graphics/Rect;)V",
                &[JValue::Object(&rect)],
            )?;
            Ok(Rect::new(
                int_field(env, &rect, "left")?,
                int_field(env, &rect, "top")?,
                int_field(env, &rect, "right")?,
                int_field(env, &rect, "bottom")?,
            ))
        });
        checked(&mut env, "View.getWindowVisibleDisplayFrame", frame)
    }

    fn window_height(&self) -> Result<i32> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let height = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> jni::errors::Result<_> {
            let decor = decor_view(env, &activity)?;
            env.call_method(&decor, "getHeight", "()I", &[])?.i()
        });
        checked(&mut env, "View.getHeight", height)
    }

    fn dimension_pixel_size(&self, name: &str) -> Result<Option<i32>> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let size = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> jni::errors::Result<_> {
            let resources = env
                .call_method(
                    &activity,
                    "getResources",
                    "()Landroid/content/res/Resources;",
                    &[],
                )?
                .l()?;
            let j_name = env.new_string(name)?;
            let j_type = env.new_string("dimen")?;
            let j_package = env.new_string("android")?;
            let id = env
                .call_method(
                    &resources,
                    "getIdentifier",
                    "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)I",
                    &[
                        JValue::Object(&j_name),
                        JValue::Object(&j_type),
                        JValue::Object(&j_package),
                    ],
                )?
                .i()?;
            if id <= 0 {
                return Ok(None);
            }
            let px = env
                .call_method(&resources, "getDimensionPixelSize", "(I)I", &[JValue::Int(id)])?
                .i()?;
            Ok(Some(px))
        });
        checked(&mut env, "Resources.getDimensionPixelSize", size)
    }
}

// ---------------------------------------------------------------------------
// AndroidUiDispatcher: main looper via the host glue class
// ---------------------------------------------------------------------------

type PendingTasks = Mutex<HashMap<jlong, UiTask>>;

static PENDING_TASKS: OnceLock<PendingTasks> = OnceLock::new();
static NEXT_TOKEN: AtomicI64 = AtomicI64::new(1);

fn pending_tasks() -> &'static PendingTasks {
    PENDING_TASKS.get_or_init(Default::default)
}

/// Posts tasks to the Activity's main looper.
pub struct AndroidUiDispatcher;

impl AndroidUiDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidUiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDispatcher for AndroidUiDispatcher {
    fn dispatch(&self, task: UiTask) -> Result<()> {
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        pending_tasks()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, task);

        if let Err(e) = post_to_ui_thread(token) {
            pending_tasks()
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&token);
            tracing::error!(error = %e, token, "Android: could not post UI task");
            return Err(SysBarsError::UiThreadUnavailable);
        }
        Ok(())
    }
}

/// Ask the host glue to run `nativeRunUiTask(token)` on the main looper.
///
/// The class is loaded through the Activity's class loader: callers run on
/// native threads whose default loader cannot see application classes.
fn post_to_ui_thread(token: jlong) -> Result<()> {
    let mut env = jni_env()?;
    let activity = activity()?;
    let posted = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| -> jni::errors::Result<_> {
        let loader = env
            .call_method(&activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?
            .l()?;
        let class_name = env.new_string(HOST_BRIDGE_CLASS)?;
        let class = env
            .call_method(
                &loader,
                "loadClass",
                "(Ljava/lang/String;)Ljava/lang/Class;",
                &[JValue::Object(&class_name)],
            )?
            .l()?;
        let class = JClass::from(class);
        env.call_static_method(
            &class,
            "postToUiThread",
            "(Landroid/app/Activity;J)V",
            &[JValue::Object(&activity), JValue::Long(token)],
        )?;
        Ok(())
    });
    checked(&mut env, "SystemBarsBridge.postToUiThread", posted)
}

// ---------------------------------------------------------------------------
// Exported entry points called by the host glue class
// ---------------------------------------------------------------------------

/// `SystemBarsBridge.nativeInit(Activity)`, called from `onCreate` before the
/// plugin is built. Safe to call again for a recreated Activity.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sysbars_SystemBarsBridge_nativeInit(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    activity: JObject<'_>,
) {
    let attached = catch_unwind(AssertUnwindSafe(|| {
        let attached = attach_host(&mut env, &activity);
        checked(&mut env, "SystemBarsBridge.nativeInit", attached)
    }));
    match attached {
        Ok(Ok(())) => tracing::info!("Android: host Activity attached"),
        Ok(Err(e)) => tracing::error!(error = %e, "Android: could not attach host Activity"),
        Err(_) => tracing::error!("Android: nativeInit panicked"),
    }
}

/// `SystemBarsBridge.nativeRelease(Activity)`, called from `onDestroy`.
///
/// A newer Activity that already called `nativeInit` stays attached.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sysbars_SystemBarsBridge_nativeRelease(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    activity: JObject<'_>,
) {
    let detached = catch_unwind(AssertUnwindSafe(|| {
        let detached = detach_host(&mut env, &activity);
        checked(&mut env, "SystemBarsBridge.nativeRelease", detached)
    }));
    match detached {
        Ok(Ok(true)) => tracing::info!("Android: host Activity released"),
        Ok(Ok(false)) => tracing::debug!("Android: released Activity was not attached"),
        Ok(Err(e)) => tracing::error!(error = %e, "Android: could not release host Activity"),
        Err(_) => tracing::error!("Android: nativeRelease panicked"),
    }
}

/// `SystemBarsBridge.nativeRunUiTask(long)`, called on the main looper.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sysbars_SystemBarsBridge_nativeRunUiTask(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    token: jlong,
) {
    let task = pending_tasks()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&token);
    match task {
        // A panic must not unwind into the JVM.
        Some(task) => {
            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                tracing::error!(token, "Android: UI task panicked");
            }
        }
        None => tracing::warn!(token, "Android: no pending UI task for token"),
    }
}

/// `SystemBarsBridge.nativeOnConfigurationChanged()`, called from the
/// Activity's `onConfigurationChanged`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_sysbars_SystemBarsBridge_nativeOnConfigurationChanged(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) {
    match crate::lifecycle::loaded().active() {
        Some(plugin) => {
            let notified = catch_unwind(AssertUnwindSafe(|| {
                plugin.handle_on_configuration_changed()
            }));
            match notified {
                Ok(listeners) => {
                    tracing::debug!(listeners, "Android: configuration change forwarded")
                }
                Err(_) => tracing::error!("Android: configuration listener panicked"),
            }
        }
        None => tracing::debug!("Android: configuration change with no plugin loaded"),
    }
}
