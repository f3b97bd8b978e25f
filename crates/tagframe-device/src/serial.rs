//! Raw-mode configuration for serial lines.

use std::fs::File;
use std::io;
use std::mem::MaybeUninit;
use std::os::fd::AsRawFd;

/// Map a numeric baud rate onto the termios speed constant.
pub fn speed_for(baud_rate: u32) -> Option<libc::speed_t> {
    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        _ => return None,
    };
    Some(speed)
}

/// Put the terminal behind `file` into raw 8N1 mode at `baud_rate`.
///
/// Reads block until at least one byte is available (VMIN=1, VTIME=0).
pub fn configure_raw(file: &File, baud_rate: u32) -> io::Result<()> {
    let speed = speed_for(baud_rate).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported baud rate {baud_rate}"),
        )
    })?;
    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::<libc::termios>::uninit();
    // SAFETY: `fd` is an open descriptor owned by `file` and `termios` points to
    // writable storage of the right size.
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: tcgetattr succeeded, so the struct is fully initialised.
    let mut termios = unsafe { termios.assume_init() };

    // SAFETY: `termios` is a valid, initialised termios struct.
    unsafe {
        libc::cfmakeraw(&mut termios);
        if libc::cfsetispeed(&mut termios, speed) != 0
            || libc::cfsetospeed(&mut termios, speed) != 0
        {
            return Err(io::Error::last_os_error());
        }
    }
    termios.c_cflag |= libc::CLOCAL | libc::CREAD;
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;

    // SAFETY: `fd` is open and `termios` is initialised.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
