/// Callbacks of the application that consumes the printer function.
///
/// All callbacks run synchronously on the controller's event thread, between two bus events.
/// They must not block: while [PrinterInterface::receive] runs, the OUT endpoint NAKs, and it
/// stays NAKing until the application asks for the next packet with
/// [crate::PrinterGadget::receive_packet].
pub trait PrinterInterface {
    /// The host configured the function; both bulk endpoints are open.
    fn init(&mut self);
    /// The function was torn down.
    fn deinit(&mut self);

    /// A printer class request.
    ///
    /// For device-to-host requests `buf` is the control data buffer and `len` holds the number
    /// of bytes the host asked for; the callback fills `buf` and may shorten `len` before the
    /// data stage is sent. For host-to-device requests `buf[..len]` holds the received data
    /// stage. Requests without a data stage (such as SOFT_RESET) pass the raw SETUP packet with
    /// `len` set to 0.
    fn control_req(&mut self, code: u8, buf: &mut [u8], len: &mut u16);

    /// A bulk OUT transfer of `len` bytes landed at the start of `buf`.
    fn receive(&mut self, buf: &mut [u8], len: &mut usize);
}
