use crate::{FormatReaderServant, ReaderError, reader_of};
use example_tenacio_rpc_service_definition::format_reader::*;
use std::sync::Arc;
use tenacio::Context;
use tenacio_rpc_service::{DEFAULT_FACET, ServiceType};
use tenacio_rpc_service_endpoint::{
    HandlerError, RpcServiceEndpointInterface,
    error::{HandlerPayloadError, RpcServiceEndpointError},
};
use tenacio_tokio_rpc_server::ConnectionContext;

fn declared(err: ReaderError) -> HandlerError {
    HandlerPayloadError::from(err).into()
}

/// Registers one operation whose handler borrows the servant and the id of
/// the reader the call addresses.
macro_rules! serve {
    ($endpoint:expr, $servant:expr, $op:ty, |$reader:ident, $id:ident, $input:pat_param| $body:expr) => {{
        let servant = $servant.clone();
        $endpoint
            .register_operation::<$op, _, _>(
                move |_peer: ConnectionContext, $input, context: Context| {
                    let servant = servant.clone();
                    let reader_id = reader_of(&context).to_string();
                    async move {
                        let $reader = &*servant;
                        let $id = reader_id.as_str();
                        $body.map_err(declared)
                    }
                },
            )
            .await
    }};
}

/// Makes `servant` answer every reader operation on `endpoint`'s default
/// facet.
pub async fn register_format_reader<E>(
    endpoint: &E,
    servant: Arc<FormatReaderServant>,
) -> Result<(), RpcServiceEndpointError>
where
    E: RpcServiceEndpointInterface<ConnectionContext>,
{
    endpoint
        .add_type_id(DEFAULT_FACET, FormatReader::TYPE_ID)
        .await;

    serve!(endpoint, servant, SetId, |r, id, file| r.set_id(id, &file).await)?;
    serve!(endpoint, servant, Close, |r, id, ()| {
        r.close(id).await;
        Ok::<_, ReaderError>(())
    })?;
    serve!(endpoint, servant, SetMetadataCollected, |r, id, collect| {
        r.set_metadata_collected(id, collect).await;
        Ok::<_, ReaderError>(())
    })?;

    serve!(endpoint, servant, GetSizeX, |r, id, ()| r
        .series_info(id, |s| s.size_x)
        .await)?;
    serve!(endpoint, servant, GetSizeY, |r, id, ()| r
        .series_info(id, |s| s.size_y)
        .await)?;
    serve!(endpoint, servant, GetSizeZ, |r, id, ()| r
        .series_info(id, |s| s.size_z)
        .await)?;
    serve!(endpoint, servant, GetSizeC, |r, id, ()| r
        .series_info(id, |s| s.size_c)
        .await)?;
    serve!(endpoint, servant, GetSizeT, |r, id, ()| r
        .series_info(id, |s| s.size_t)
        .await)?;
    serve!(endpoint, servant, GetImageCount, |r, id, ()| r
        .series_info(id, |s| s.image_count())
        .await)?;
    serve!(endpoint, servant, GetPixelType, |r, id, ()| r
        .series_info(id, |s| s.pixel_type)
        .await)?;
    serve!(endpoint, servant, GetDimensionOrder, |r, id, ()| r
        .series_info(id, |s| s.dimension_order.clone())
        .await)?;
    serve!(endpoint, servant, IsRgb, |r, id, ()| r
        .series_info(id, |s| s.rgb)
        .await)?;
    serve!(endpoint, servant, GetFormat, |r, id, ()| r.format(id).await)?;
    serve!(endpoint, servant, GetCurrentFile, |r, id, ()| r
        .current_file(id)
        .await)?;

    serve!(endpoint, servant, GetSeriesCount, |r, id, ()| r
        .series_count(id)
        .await)?;
    serve!(endpoint, servant, SetSeries, |r, id, series| r
        .set_series(id, series)
        .await)?;
    serve!(endpoint, servant, GetSeries, |r, id, ()| r.series(id).await)?;

    serve!(endpoint, servant, GetIndex, |r, id, (z, c, t)| r
        .index(id, z, c, t)
        .await)?;
    serve!(endpoint, servant, GetZctCoords, |r, id, index| r
        .zct_coords(id, index)
        .await)?;
    serve!(endpoint, servant, OpenBytes, |r, id, no| r
        .open_bytes(id, no)
        .await)?;

    tracing::debug!("registered {}", FormatReader::TYPE_ID);
    Ok(())
}
