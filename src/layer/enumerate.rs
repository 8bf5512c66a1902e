//! Two-call enumeration helpers
//!
//! Vulkan list queries are called once with no output to get a count and
//! again with a caller-sized array. These helpers implement both halves for
//! the layer: reading a complete list from the next layer, and answering the
//! application with the next layer's list plus the layer's own entries.

use ash::prelude::VkResult;
use ash::vk;

/// Read the complete list from a two-call query
///
/// Retries when the list grows between the count and the fill call.
pub fn enumerate<T, F>(mut query: F) -> VkResult<Vec<T>>
where
    T: Default + Clone,
    F: FnMut(&mut u32, Option<&mut [T]>) -> vk::Result,
{
    loop {
        let mut count = 0u32;
        let result = query(&mut count, None);
        if result != vk::Result::SUCCESS {
            return Err(result);
        }

        let mut items = vec![T::default(); count as usize];
        match query(&mut count, Some(&mut items)) {
            vk::Result::SUCCESS => {
                items.truncate(count as usize);
                return Ok(items);
            }
            vk::Result::INCOMPLETE => continue,
            error => return Err(error),
        }
    }
}

/// Answer with the next layer's list followed by `extras`
///
/// `write` fills one output slot from an extra entry, so structures with a
/// `p_next` chain owned by the caller keep it.
pub fn append_with<T, E, F, W>(
    next: F,
    extras: &[E],
    count: &mut u32,
    out: Option<&mut [T]>,
    write: W,
) -> vk::Result
where
    F: FnOnce(&mut u32, Option<&mut [T]>) -> vk::Result,
    W: Fn(&mut T, &E),
{
    let Some(out) = out else {
        let mut base = 0u32;
        let result = next(&mut base, None);
        if result != vk::Result::SUCCESS {
            return result;
        }
        *count = base + extras.len() as u32;
        return vk::Result::SUCCESS;
    };

    let capacity = (*count as usize).min(out.len());
    let out = &mut out[..capacity];

    let mut written = capacity as u32;
    let result = next(&mut written, Some(&mut *out));
    if result != vk::Result::SUCCESS {
        *count = written;
        return result;
    }

    let free = &mut out[(written as usize).min(capacity)..];
    let appended = free.len().min(extras.len());
    for (slot, extra) in free.iter_mut().zip(extras) {
        write(slot, extra);
    }
    *count = written + appended as u32;

    if appended < extras.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

/// [`append_with`] for plain copyable entries
pub fn append<T, F>(next: F, extras: &[T], count: &mut u32, out: Option<&mut [T]>) -> vk::Result
where
    T: Copy,
    F: FnOnce(&mut u32, Option<&mut [T]>) -> vk::Result,
{
    append_with(next, extras, count, out, |slot, extra| *slot = *extra)
}

/// Answer with a fixed list
pub fn array<T: Copy>(items: &[T], count: &mut u32, out: Option<&mut [T]>) -> vk::Result {
    let Some(out) = out else {
        *count = items.len() as u32;
        return vk::Result::SUCCESS;
    };

    let written = (*count as usize).min(out.len()).min(items.len());
    out[..written].copy_from_slice(&items[..written]);
    *count = written as u32;

    if written < items.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}
