//! 接口状态检查
//!
//! 打开 socket 前确认接口存在且处于 UP 状态，给出可操作的错误提示，
//! 而不是让 `CanSocket::open` 返回笼统的 ENODEV。只读操作，不需要特殊权限。

use crate::CanError;
use libc::{AF_INET, IFF_UP, SIOCGIFFLAGS, SOCK_DGRAM, if_nametoindex, ifreq};
use std::ffi::CString;
use std::io;
use tracing::trace;

/// IFNAMSIZ - 1（结尾 NUL 占一个字节）
const MAX_IFACE_NAME_LEN: usize = 15;

/// ioctl 用的临时 fd，drop 时关闭
struct FdGuard(libc::c_int);

impl Drop for FdGuard {
    fn drop(&mut self) {
        if self.0 >= 0 {
            unsafe { libc::close(self.0) };
        }
    }
}

/// 检查接口是否存在且已启动
///
/// - `Ok(true)`: 存在且 IFF_UP
/// - `Ok(false)`: 存在但 DOWN
/// - `Err(CanError::Device)`: 不存在或名字无效
/// - `Err(CanError::Io)`: socket/ioctl 失败
pub fn check_interface_status(interface: &str) -> Result<bool, CanError> {
    if interface.is_empty() || interface.len() > MAX_IFACE_NAME_LEN {
        return Err(CanError::Device(format!(
            "Invalid interface name '{}' (1..={} characters)",
            interface, MAX_IFACE_NAME_LEN
        )));
    }

    let c_iface = CString::new(interface)
        .map_err(|e| CanError::Device(format!("Invalid interface name: {}", e)))?;

    let ifindex = unsafe { if_nametoindex(c_iface.as_ptr()) };
    if ifindex == 0 {
        return Err(CanError::Device(format!(
            "CAN interface '{}' does not exist ({}). Create it first:\n  sudo ip link add dev {} type can",
            interface,
            io::Error::last_os_error(),
            interface
        )));
    }

    let mut ifr: ifreq = unsafe { std::mem::zeroed() };
    for (dst, src) in ifr.ifr_name.iter_mut().zip(c_iface.as_bytes_with_nul()) {
        *dst = *src as libc::c_char;
    }

    let sockfd = unsafe { libc::socket(AF_INET, SOCK_DGRAM, 0) };
    if sockfd < 0 {
        return Err(CanError::Io(io::Error::last_os_error()));
    }
    let guard = FdGuard(sockfd);

    let result = unsafe {
        libc::ioctl(
            guard.0,
            SIOCGIFFLAGS as _,
            &mut ifr as *mut ifreq as *mut libc::c_void,
        )
    };
    if result < 0 {
        return Err(CanError::Io(io::Error::last_os_error()));
    }

    // ifru_flags 是 ifr_ifru 联合体的第一个成员（c_short）
    let flags = unsafe { *(std::ptr::addr_of!(ifr.ifr_ifru) as *const libc::c_short) };
    let is_up = (flags as libc::c_int & IFF_UP) != 0;

    trace!(
        "Interface '{}' is {}",
        interface,
        if is_up { "UP" } else { "DOWN" }
    );
    Ok(is_up)
}
