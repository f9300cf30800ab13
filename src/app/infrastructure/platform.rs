//! "Open with MdReader" entry in the file manager's context menu.

use super::error::{AppError, Result};
use super::io::ShellIntegration;

pub const CONTEXT_MENU_LABEL: &str = "Open with MdReader";

#[cfg(target_os = "windows")]
const SHELL_KEY: &str = "Software\\Classes\\*\\shell\\MdReader";

/// Registers the running executable as a per-user context menu handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsShellIntegration;

impl ShellIntegration for OsShellIntegration {
    #[cfg(target_os = "windows")]
    fn register(&self) -> Result<()> {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let exe = std::env::current_exe()?;
        let exe = exe.to_string_lossy().to_string();

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (menu, _) = hkcu.create_subkey(SHELL_KEY).map_err(registry_error)?;
        menu.set_value("", &CONTEXT_MENU_LABEL).map_err(registry_error)?;
        menu.set_value("Icon", &exe).map_err(registry_error)?;

        let (command, _) = menu.create_subkey("command").map_err(registry_error)?;
        command
            .set_value("", &format!("\"{}\" \"%1\"", exe))
            .map_err(registry_error)?;

        log::info!("context menu registered for {}", exe);
        Ok(())
    }

    #[cfg(target_os = "windows")]
    fn unregister(&self) -> Result<()> {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        match hkcu.delete_subkey_all(SHELL_KEY) {
            Ok(()) => {}
            // Already gone.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(registry_error(e)),
        }
        log::info!("context menu unregistered");
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn register(&self) -> Result<()> {
        Err(unsupported())
    }

    #[cfg(not(target_os = "windows"))]
    fn unregister(&self) -> Result<()> {
        Err(unsupported())
    }
}

#[cfg(target_os = "windows")]
fn registry_error(e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        AppError::PermissionDenied(SHELL_KEY.to_string())
    } else {
        AppError::ShellIntegration(e.to_string())
    }
}

#[cfg(not(target_os = "windows"))]
fn unsupported() -> AppError {
    AppError::ShellIntegration(format!(
        "context menu registration is not supported on {}",
        std::env::consts::OS
    ))
}
