use kernel::KernelError;

/// Extension for funneling storage errors into the kernel error taxonomy.
pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}
