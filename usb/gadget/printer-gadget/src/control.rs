//! Control requests addressed to the printer interface.

use driver_gadget::{DeviceState, ReqDirection, ReqType, Setup, StandardReq, UDCAdapter};
use log::{debug, warn};

use crate::error::{PrinterError, Result};
use crate::gadget::PrinterGadget;
use crate::instance::PRINTER_DATA_BUFFER_SIZE;

impl<'a> PrinterGadget<'a> {
    pub(crate) fn handle_setup<U: UDCAdapter>(&mut self, udc: &mut U, setup: &Setup) -> Result<()> {
        // A new SETUP aborts any control transfer still waiting for its data stage.
        if let Some(instance) = self.instance.get_mut() {
            instance.pending_request = None;
        }

        let result = match setup.req_ty() {
            ReqType::Class => self.class_request(udc, setup),
            ReqType::Standard => self.standard_request(udc, setup),
            other => Err(PrinterError::UnsupportedRequest {
                kind: other.as_str(),
                request: setup.request,
            }),
        };

        if let Err(err) = &result {
            if !matches!(err, PrinterError::Udc(_)) {
                warn!("printer: stalling {:?}: {}", setup, err);
                udc.ctl_error();
            }
        }
        result
    }

    fn class_request<U: UDCAdapter>(&mut self, udc: &mut U, setup: &Setup) -> Result<()> {
        let instance = self.instance.get_mut().ok_or(PrinterError::NotActive)?;
        let interface = self
            .interface
            .as_deref_mut()
            .ok_or(PrinterError::NoInterfaceBound)?;

        let code = setup.request;
        let length = setup.length;
        debug!("printer: class request {:#04x}, length {}", code, length);

        if length == 0 {
            let mut raw = setup.to_bytes();
            let mut len = 0;
            interface.control_req(code, &mut raw, &mut len);
            return Ok(());
        }

        let requested = length.min(PRINTER_DATA_BUFFER_SIZE as u16);
        let mut len = requested;
        match setup.direction() {
            ReqDirection::DeviceToHost => {
                interface.control_req(code, &mut instance.data, &mut len);
                // Never answer with more than the host asked for.
                let len = usize::from(len.min(requested));
                udc.ctl_send_data(&instance.data[..len])?;
            }
            ReqDirection::HostToDevice => {
                // Handed to the application once the data stage arrives, see
                // `handle_ep0_rx_ready`.
                instance.pending_request = Some(code);
                udc.ctl_prepare_rx(usize::from(len))?;
            }
        }
        Ok(())
    }

    fn standard_request<U: UDCAdapter>(&mut self, udc: &mut U, setup: &Setup) -> Result<()> {
        let state = udc.device_state();
        let request = match StandardReq::from_u8(setup.request) {
            Some(request) => request,
            None => {
                return Err(PrinterError::UnsupportedRequest {
                    kind: "standard",
                    request: setup.request,
                })
            }
        };
        let configured = |request| {
            if state == DeviceState::Configured {
                Ok(())
            } else {
                Err(PrinterError::InvalidState { request, state })
            }
        };

        match request {
            StandardReq::GetStatus => {
                configured(request)?;
                udc.ctl_send_data(&[0, 0])?;
            }
            StandardReq::GetInterface => {
                configured(request)?;
                let instance = self.instance.get().ok_or(PrinterError::NotActive)?;
                udc.ctl_send_data(&[instance.alt_setting])?;
            }
            // Only alternate setting 0 exists.
            StandardReq::SetInterface => configured(request)?,
            StandardReq::ClearFeature => (),
            _ => {
                return Err(PrinterError::UnsupportedRequest {
                    kind: "standard",
                    request: setup.request,
                })
            }
        }
        Ok(())
    }

    pub(crate) fn handle_ep0_rx_ready<U: UDCAdapter>(
        &mut self,
        _udc: &mut U,
        data: &[u8],
    ) -> Result<()> {
        let instance = self.instance.get_mut().ok_or(PrinterError::NotActive)?;
        let code = match instance.pending_request.take() {
            Some(code) => code,
            None => {
                debug!("printer: control data stage of {} bytes without a request", data.len());
                return Ok(());
            }
        };
        let interface = self
            .interface
            .as_deref_mut()
            .ok_or(PrinterError::NoInterfaceBound)?;

        let len = data.len().min(PRINTER_DATA_BUFFER_SIZE);
        instance.data[..len].copy_from_slice(&data[..len]);
        let mut len = len as u16;
        interface.control_req(code, &mut instance.data, &mut len);
        Ok(())
    }
}
