// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Catena` trait implementation — all gRPC RPC handlers, each a thin
//! adapter from protobuf request/response shapes onto `catena_core`'s
//! transport-agnostic handler functions.

use std::pin::Pin;

use catena_core::connect::{connect, deregister};
use catena_core::device::DetailLevel;
use catena_core::rpc::handlers;
use catena_core::status::CatenaError;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

use super::convert::{
    command_response_to_proto, detail_level_from_proto, language_pack_from_proto, param_detail_to_proto,
    param_entry_to_device_component, param_entry_to_proto, param_info_entry_to_proto, push_update_to_proto,
    value_from_proto, value_to_proto,
};
use super::{proto, CatenaGrpc};
use crate::error_map::to_grpc_status;

type GrpcStream<T> = Pin<Box<dyn tokio_stream::Stream<Item = Result<T, Status>> + Send + 'static>>;

fn map_err(err: CatenaError) -> Status {
    to_grpc_status(&err)
}

fn stream_of<T: Send + 'static>(items: Vec<T>) -> GrpcStream<T> {
    Box::pin(tokio_stream::iter(items.into_iter().map(Ok)))
}

#[tonic::async_trait]
impl proto::catena_server::Catena for CatenaGrpc {
    async fn get_populated_slots(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::SlotList>, Status> {
        let slots = handlers::get_populated_slots(self.state.registry.as_ref());
        Ok(Response::new(proto::SlotList { slots }))
    }

    async fn get_value(
        &self,
        request: Request<proto::GetValueRequest>,
    ) -> Result<Response<proto::GetValueResponse>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let value = handlers::get_value(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            &req.oid,
        )
        .await
        .map_err(map_err)?;
        Ok(Response::new(proto::GetValueResponse { value: Some(value_to_proto(value)) }))
    }

    async fn get_param(&self, request: Request<proto::GetParamRequest>) -> Result<Response<proto::Param>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let detail = handlers::get_param(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            &req.oid,
        )
        .await
        .map_err(map_err)?;
        Ok(Response::new(param_detail_to_proto(detail)))
    }

    async fn set_value(&self, request: Request<proto::SingleSetValuePayload>) -> Result<Response<proto::Empty>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let value = req.value.map(value_from_proto).unwrap_or(catena_core::device::Value::Empty);
        handlers::set_value(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            &req.oid,
            value,
        )
        .await
        .map_err(map_err)?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn multi_set_value(
        &self,
        request: Request<proto::MultiSetValuePayload>,
    ) -> Result<Response<proto::Empty>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let values = req
            .values
            .into_iter()
            .map(|p| (p.oid, p.value.map(value_from_proto).unwrap_or(catena_core::device::Value::Empty)))
            .collect();
        handlers::multi_set_value(bearer.as_deref(), self.state.authz_enabled, self.state.registry.as_ref(), req.slot, values)
            .await
            .map_err(map_err)?;
        Ok(Response::new(proto::Empty {}))
    }

    type DeviceRequestStream = GrpcStream<proto::DeviceComponent>;

    async fn device_request(
        &self,
        request: Request<proto::DeviceRequestPayload>,
    ) -> Result<Response<Self::DeviceRequestStream>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let detail_level = detail_level_from_proto(req.detail_level);
        let subs = self.state.subscriptions.get(req.slot).map(|m| m.as_ref());
        let entries = handlers::device_request(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            detail_level,
            req.subscribed_oids,
            subs,
        )
        .await
        .map_err(map_err)?;
        let items = entries.into_iter().map(param_entry_to_device_component).collect();
        Ok(Response::new(stream_of(items)))
    }

    type ExecuteCommandStream = GrpcStream<proto::CommandResponse>;

    async fn execute_command(
        &self,
        request: Request<proto::ExecuteCommandPayload>,
    ) -> Result<Response<Self::ExecuteCommandStream>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let value = req.value.map(value_from_proto).unwrap_or(catena_core::device::Value::Empty);
        let responses = handlers::execute_command(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            &req.oid,
            value,
            req.respond,
        )
        .await
        .map_err(map_err)?;
        let items = responses.into_iter().map(command_response_to_proto).collect();
        Ok(Response::new(stream_of(items)))
    }

    async fn add_language(&self, request: Request<proto::AddLanguagePayload>) -> Result<Response<proto::Empty>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let pack = req
            .language_pack
            .map(language_pack_from_proto)
            .ok_or_else(|| Status::invalid_argument("language_pack is required"))?;
        handlers::add_language(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            &req.language_id,
            pack,
        )
        .await
        .map_err(map_err)?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn list_languages(&self, request: Request<proto::SlotRequest>) -> Result<Response<proto::LanguageList>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let languages =
            handlers::list_languages(bearer.as_deref(), self.state.authz_enabled, self.state.registry.as_ref(), req.slot)
                .await
                .map_err(map_err)?;
        Ok(Response::new(proto::LanguageList { languages }))
    }

    type ParamInfoRequestStream = GrpcStream<proto::ParamInfoResponse>;

    async fn param_info_request(
        &self,
        request: Request<proto::ParamInfoRequestPayload>,
    ) -> Result<Response<Self::ParamInfoRequestStream>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let entries = handlers::param_info_request(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            req.oid_prefix.as_deref(),
            req.recursive,
        )
        .await
        .map_err(map_err)?;
        let items = entries.into_iter().map(param_info_entry_to_proto).collect();
        Ok(Response::new(stream_of(items)))
    }

    type UpdateSubscriptionsStream = GrpcStream<proto::DeviceComponent>;

    async fn update_subscriptions(
        &self,
        request: Request<proto::UpdateSubscriptionsPayload>,
    ) -> Result<Response<Self::UpdateSubscriptionsStream>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let subs = self
            .state
            .subscriptions
            .get(req.slot)
            .ok_or_else(|| Status::not_found(format!("device not found in slot {}", req.slot)))?;
        let entries = handlers::update_subscriptions(
            bearer.as_deref(),
            self.state.authz_enabled,
            self.state.registry.as_ref(),
            req.slot,
            req.added_oids,
            req.removed_oids,
            subs,
        )
        .await
        .map_err(map_err)?;
        let items = entries.into_iter().map(param_entry_to_device_component).collect();
        Ok(Response::new(stream_of(items)))
    }

    type ConnectStream = GrpcStream<proto::PushUpdates>;

    async fn connect(&self, request: Request<proto::ConnectPayload>) -> Result<Response<Self::ConnectStream>, Status> {
        let bearer = Self::bearer_header(&request).map(str::to_owned);
        let req = request.into_inner();
        let authz = catena_core::rpc::template::authorize(bearer.as_deref(), self.state.authz_enabled)
            .await
            .map_err(map_err)?;
        let detail_level = detail_level_from_proto(req.detail_level);
        let priority = if req.force_connection { 1 } else { 0 };
        let (id, mut rx) = connect(
            self.state.registry.clone(),
            authz,
            detail_level,
            priority,
            self.state.subscriptions.as_session_subscriptions(),
            self.state.queue.clone(),
            self.state.shutdown.clone(),
        )
        .map_err(map_err)?;

        let (tx, out_rx) = tokio::sync::mpsc::channel(64);
        let queue = self.state.queue.clone();
        tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                if tx.send(Ok(push_update_to_proto(update))).await.is_err() {
                    break;
                }
            }
            deregister(queue.as_ref(), id);
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(out_rx))))
    }

    async fn shutdown(&self, _request: Request<proto::Empty>) -> Result<Response<proto::Empty>, Status> {
        self.state.shutdown.cancel();
        Ok(Response::new(proto::Empty {}))
    }
}
