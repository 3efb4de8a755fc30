//! C ABI.
//!
//! [`st_plugin_info`] returns a table of callbacks per plugin variant. Shared
//! state and voices cross the boundary as opaque pointers created by the
//! `*_new` callbacks and released by the matching `*_delete` callbacks.
//! Construction failures are reported as null pointers.

use alloc::boxed::Box;
use core::ffi::{c_char, c_void, CStr};
use core::ptr;

use log::warn;

use crate::fm::config::Fidelity;
use crate::fm::params::PARAM_COUNT;
use crate::fm::voice::{Glide, Voice};
use crate::fm::NUM_MOD_INPUTS;
use crate::plugin::Shared;

pub const API_VERSION: u32 = 1;

pub type SharedNewFn = unsafe extern "C" fn() -> *mut c_void;
pub type SharedDeleteFn = unsafe extern "C" fn(shared: *mut c_void);
pub type SetParamFn = unsafe extern "C" fn(shared: *mut c_void, index: u32, value: f32) -> i32;
pub type VoiceNewFn =
    unsafe extern "C" fn(shared: *const c_void, sample_rate: f32, seed: u32) -> *mut c_void;
pub type VoiceDeleteFn = unsafe extern "C" fn(voice: *mut c_void);
pub type NoteOnFn =
    unsafe extern "C" fn(voice: *mut c_void, shared: *const c_void, velocity: f32, glide: i32);
pub type NoteOffFn = unsafe extern "C" fn(voice: *mut c_void);
pub type SetModValueFn = unsafe extern "C" fn(voice: *mut c_void, index: u32, value: f32);
pub type PrepareBlockFn = unsafe extern "C" fn(
    voice: *mut c_void,
    shared: *const c_void,
    num_frames: u32,
    freq_hz: f32,
    note: f32,
    vol: f32,
    pan: f32,
);
pub type ProcessReplaceFn = unsafe extern "C" fn(
    voice: *mut c_void,
    shared: *const c_void,
    mono_in: i32,
    samples_in: *const f32,
    samples_out: *mut f32,
    num_frames: u32,
);

#[repr(C)]
pub struct StPluginInfo {
    pub api_version: u32,
    pub id: *const c_char,
    pub name: *const c_char,
    pub num_params: u32,
    pub num_mod_inputs: u32,

    pub shared_new: SharedNewFn,
    pub shared_delete: SharedDeleteFn,
    pub set_param: SetParamFn,
    pub voice_new: VoiceNewFn,
    pub voice_delete: VoiceDeleteFn,
    pub note_on: NoteOnFn,
    pub note_off: NoteOffFn,
    pub set_mod_value: SetModValueFn,
    pub prepare_block: PrepareBlockFn,
    pub process_replace: ProcessReplaceFn,
}

struct PluginTable([StPluginInfo; Fidelity::ALL.len()]);

// The table only holds pointers to static strings and functions.
unsafe impl Sync for PluginTable {}

const fn fidelity(index: usize) -> Fidelity {
    Fidelity::ALL[index]
}

const fn entry<const F: usize>(id: &'static CStr, name: &'static CStr) -> StPluginInfo {
    StPluginInfo {
        api_version: API_VERSION,
        id: id.as_ptr(),
        name: name.as_ptr(),
        num_params: PARAM_COUNT as u32,
        num_mod_inputs: NUM_MOD_INPUTS as u32,

        shared_new: shared_new::<F>,
        shared_delete,
        set_param,
        voice_new,
        voice_delete,
        note_on,
        note_off,
        set_mod_value,
        prepare_block,
        process_replace,
    }
}

static PLUGINS: PluginTable = PluginTable([
    entry::<0>(c"fm_stack_lofi", c"FM Stack Lo-Fi"),
    entry::<1>(c"fm_stack", c"FM Stack"),
    entry::<2>(c"fm_stack_hq", c"FM Stack HQ"),
    entry::<3>(c"fm_stack_uhq", c"FM Stack Ultra"),
    entry::<4>(c"fm_stack_xhq", c"FM Stack Extreme"),
]);

/// Callback table of plugin variant `index`, or null past the last one.
#[no_mangle]
pub extern "C" fn st_plugin_info(index: u32) -> *const StPluginInfo {
    match PLUGINS.0.get(index as usize) {
        Some(info) => info,
        None => ptr::null(),
    }
}

unsafe extern "C" fn shared_new<const F: usize>() -> *mut c_void {
    match Shared::with_fidelity(fidelity(F)) {
        Ok(shared) => Box::into_raw(Box::new(shared)).cast(),
        Err(err) => {
            warn!("shared_new failed: {}", err);
            ptr::null_mut()
        }
    }
}

unsafe extern "C" fn shared_delete(shared: *mut c_void) {
    if !shared.is_null() {
        drop(Box::from_raw(shared.cast::<Shared>()));
    }
}

unsafe extern "C" fn set_param(shared: *mut c_void, index: u32, value: f32) -> i32 {
    match shared.cast::<Shared>().as_mut() {
        Some(shared) => shared.set_param(index as usize, value) as i32,
        None => 0,
    }
}

unsafe extern "C" fn voice_new(shared: *const c_void, sample_rate: f32, seed: u32) -> *mut c_void {
    let Some(shared) = shared.cast::<Shared>().as_ref() else {
        return ptr::null_mut();
    };

    match Voice::new(shared, sample_rate, seed) {
        Ok(voice) => Box::into_raw(Box::new(voice)).cast(),
        Err(err) => {
            warn!("voice_new failed: {}", err);
            ptr::null_mut()
        }
    }
}

unsafe extern "C" fn voice_delete(voice: *mut c_void) {
    if !voice.is_null() {
        drop(Box::from_raw(voice.cast::<Voice>()));
    }
}

unsafe extern "C" fn note_on(voice: *mut c_void, shared: *const c_void, velocity: f32, glide: i32) {
    if let (Some(voice), Some(shared)) = (
        voice.cast::<Voice>().as_mut(),
        shared.cast::<Shared>().as_ref(),
    ) {
        voice.note_on(shared, velocity, Glide::from(glide));
    }
}

unsafe extern "C" fn note_off(voice: *mut c_void) {
    if let Some(voice) = voice.cast::<Voice>().as_mut() {
        voice.note_off();
    }
}

unsafe extern "C" fn set_mod_value(voice: *mut c_void, index: u32, value: f32) {
    if let Some(voice) = voice.cast::<Voice>().as_mut() {
        voice.set_mod_value(index as usize, value);
    }
}

unsafe extern "C" fn prepare_block(
    voice: *mut c_void,
    shared: *const c_void,
    num_frames: u32,
    freq_hz: f32,
    note: f32,
    vol: f32,
    pan: f32,
) {
    if let (Some(voice), Some(shared)) = (
        voice.cast::<Voice>().as_mut(),
        shared.cast::<Shared>().as_ref(),
    ) {
        voice.prepare_block(shared, num_frames as usize, freq_hz, note, vol, pan);
    }
}

unsafe extern "C" fn process_replace(
    voice: *mut c_void,
    shared: *const c_void,
    mono_in: i32,
    samples_in: *const f32,
    samples_out: *mut f32,
    num_frames: u32,
) {
    let (Some(voice), Some(shared)) = (
        voice.cast::<Voice>().as_mut(),
        shared.cast::<Shared>().as_ref(),
    ) else {
        return;
    };
    if samples_out.is_null() {
        return;
    }

    let num_frames = num_frames as usize;
    let mono_in = mono_in != 0;
    let samples_in = if samples_in.is_null() {
        None
    } else {
        let len = if mono_in { num_frames } else { 2 * num_frames };
        Some(core::slice::from_raw_parts(samples_in, len))
    };
    let samples_out = core::slice::from_raw_parts_mut(samples_out, 2 * num_frames);

    voice.process_replace(shared, mono_in, samples_in, samples_out, num_frames);
}
